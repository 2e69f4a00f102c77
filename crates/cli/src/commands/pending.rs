// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! List pending records.

use trail_core::Record;

use super::status::format_ms;
use super::Context;
use crate::error::Result;

/// Tab-separated line for one record.
pub(crate) fn format_record(record: &Record) -> String {
    format!(
        "{}\t{}\t{}",
        record.id,
        format_ms(record.created_at),
        record.key
    )
}

pub fn run(ctx: &Context, json: bool) -> Result<()> {
    let queue = ctx.open_queue()?;
    let records = queue.list_pending()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No pending records");
        return Ok(());
    }
    for record in &records {
        println!("{}", format_record(record));
    }
    Ok(())
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;

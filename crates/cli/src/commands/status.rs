// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Show queue, account and connectivity status.

use chrono::{DateTime, Utc};

use super::{runtime, Context};
use crate::error::Result;

/// Format epoch milliseconds for display.
pub(crate) fn format_ms(ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => ms.to_string(),
    }
}

pub fn run(ctx: &Context) -> Result<()> {
    let queue = ctx.open_queue()?;
    let monitor = ctx.monitor()?;
    runtime()?.block_on(monitor.refresh());

    println!("State dir: {}", ctx.paths.root().display());
    println!("Server: {}", ctx.config.server_url);
    println!("Connectivity: {}", monitor.status_string());
    match ctx.credentials().username()? {
        Some(username) => println!("User: {username}"),
        None => println!("User: not logged in"),
    }
    println!("Pending: {}", queue.count()?);
    match queue.oldest_created_at()? {
        Some(ms) => println!("Oldest pending: {}", format_ms(ms)),
        None => println!("Oldest pending: none"),
    }
    let quarantined = queue.quarantined_count()?;
    if quarantined > 0 {
        println!("Quarantined: {quarantined}");
    }
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Capture a single location fix.

use trail_core::{ClockSource, LocationFix, SystemClock};

use super::{runtime, Context};
use crate::cli::FixArgs;
use crate::error::Result;

/// Build a fix from command-line arguments.
pub(crate) fn fix_from_args(args: &FixArgs) -> LocationFix {
    LocationFix {
        lat: args.lat,
        lng: args.lng,
        accuracy_m: args.accuracy.unwrap_or(0.0),
        altitude_m: args.altitude.unwrap_or(0.0),
        speed_ms: args.speed.unwrap_or(0.0),
        bearing: args.bearing.unwrap_or(0.0),
        timestamp_ms: args.timestamp,
    }
}

/// Enqueue the fix, then make one delivery attempt unless `--no-sync`.
///
/// A failed delivery is reported but is not an error: the fix is already
/// queued and will go out with a later drain.
pub fn run(ctx: &Context, args: FixArgs) -> Result<()> {
    let fix = fix_from_args(&args);
    let device_id = ctx.device_id()?;
    let entry = fix.entry(&device_id, SystemClock.now_ms())?;

    let queue = ctx.open_queue()?;
    let id = queue.append(&entry.key, &entry.payload)?;
    println!("Recorded {} (#{id})", entry.key);

    if args.no_sync {
        return Ok(());
    }

    let (outcome, pending) = runtime()?.block_on(super::sync::drain_once(ctx, queue))?;
    println!("{}", super::sync::describe(&outcome, pending));
    Ok(())
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;

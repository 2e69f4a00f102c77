// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit drain of the pending queue.

use std::sync::Arc;

use super::{runtime, Context};
use crate::error::{Error, Result};
use crate::sync::{Connectivity, DrainOutcome, NotReady};

/// Probe once, then run a single drain pass.
///
/// Returns the outcome and the number of records still pending.
pub(crate) async fn drain_once(
    ctx: &Context,
    queue: Arc<trail_core::PersistentQueue>,
) -> Result<(DrainOutcome, usize)> {
    let monitor = ctx.monitor()?;
    monitor.refresh().await;

    let engine = ctx.engine(Arc::clone(&queue), Arc::clone(&monitor) as Arc<dyn Connectivity>)?;
    let outcome = engine.drain_now().await;
    engine.shutdown().await;

    Ok((outcome?, queue.count()?))
}

/// One-line, human-readable drain result.
pub(crate) fn describe(outcome: &DrainOutcome, pending: usize) -> String {
    match outcome {
        DrainOutcome::NotReady(NotReady::Unauthenticated) => {
            format!("Not logged in; {pending} record(s) kept for later")
        }
        DrainOutcome::NotReady(NotReady::Offline) => {
            format!("Collector unreachable; {pending} record(s) kept for later")
        }
        DrainOutcome::Empty => "Nothing to sync".to_string(),
        DrainOutcome::Completed { delivered } => {
            format!("Delivered {delivered} record(s)")
        }
        DrainOutcome::Stopped {
            delivered, error, ..
        } => format!(
            "Delivered {delivered} record(s); stopped on failure: {error}; {pending} pending"
        ),
    }
}

pub fn run(ctx: &Context) -> Result<()> {
    let queue = ctx.open_queue()?;
    let (outcome, pending) = runtime()?.block_on(drain_once(ctx, queue))?;

    match outcome {
        DrainOutcome::NotReady(NotReady::Unauthenticated) => Err(Error::NotLoggedIn),
        DrainOutcome::NotReady(NotReady::Offline) | DrainOutcome::Stopped { .. } => {
            Err(Error::Sync(describe(&outcome, pending)))
        }
        DrainOutcome::Empty | DrainOutcome::Completed { .. } => {
            println!("{}", describe(&outcome, pending));
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;

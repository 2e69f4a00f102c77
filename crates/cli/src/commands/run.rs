// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running tracker.
//!
//! Reads fixes as JSON lines from stdin, enqueues each one and lets the sync
//! engine deliver them whenever the connectivity monitor reports the
//! collector reachable. Only one tracker may run per state directory.

use std::fs;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use trail_core::{ClockSource, LocationFix, PersistentQueue, SystemClock};

use super::{runtime, Context};
use crate::error::{Error, Result};
use crate::sync::{Connectivity, HttpSink, SyncEngine};

/// Totals reported when the tracker exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub recorded: usize,
    pub rejected: usize,
    pub pending: usize,
}

/// Take the single-instance lock for this state directory.
pub(crate) fn acquire_lock(lock_path: &Path) -> Result<fs::File> {
    use fs2::FileExt;

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| Error::AlreadyRunning(lock_path.display().to_string()))?;
    Ok(file)
}

pub fn run(ctx: &Context) -> Result<()> {
    ctx.paths.ensure()?;
    let lock = acquire_lock(&ctx.paths.lock_file())?;
    let device_id = ctx.device_id()?;
    let queue = ctx.open_queue()?;

    let summary = runtime()?.block_on(track(
        ctx,
        queue,
        &device_id,
        tokio::io::stdin(),
        interrupted(),
    ))?;
    drop(lock);

    println!(
        "Recorded {} fix(es), rejected {}, {} pending",
        summary.recorded, summary.rejected, summary.pending
    );
    Ok(())
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Run the monitor and engine while consuming `input` until EOF or `shutdown`.
pub(crate) async fn track<R, F>(
    ctx: &Context,
    queue: Arc<PersistentQueue>,
    device_id: &str,
    input: R,
    shutdown: F,
) -> Result<RunSummary>
where
    R: AsyncRead + Unpin,
    F: Future<Output = ()>,
{
    let monitor = ctx.monitor()?;
    let engine = ctx.engine(
        Arc::clone(&queue),
        Arc::clone(&monitor) as Arc<dyn Connectivity>,
    )?;

    let trigger = engine.trigger();
    monitor.start(move || trigger.request());
    tracing::info!(device_id, "tracker started");

    let produced = produce(&engine, device_id, input, shutdown).await;

    // Stop triggers first so the engine goes quiet after its in-flight pass
    monitor.stop();
    engine.shutdown().await;
    tracing::info!("tracker stopped");

    let (recorded, rejected) = produced?;
    Ok(RunSummary {
        recorded,
        rejected,
        pending: queue.count()?,
    })
}

/// Enqueue every valid line until end of input or `shutdown`.
///
/// `shutdown` is polled across iterations, so a signal that lands while a
/// line is being enqueued stops the loop before the next read.
async fn produce<R, F>(
    engine: &SyncEngine<HttpSink>,
    device_id: &str,
    input: R,
    shutdown: F,
) -> Result<(usize, usize)>
where
    R: AsyncRead + Unpin,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut lines = BufReader::new(input).lines();
    let mut line_no = 0;
    let mut recorded = 0;
    let mut rejected = 0;

    loop {
        let line = tokio::select! {
            biased;
            () = &mut shutdown => {
                tracing::info!("interrupted");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let entry = match LocationFix::parse_line(&line)
            .and_then(|fix| fix.entry(device_id, SystemClock.now_ms()))
        {
            Ok(entry) => entry,
            Err(e) => {
                rejected += 1;
                let err = Error::ParseLineError {
                    line: line_no,
                    reason: e.to_string(),
                };
                tracing::warn!(error = %err, "fix rejected");
                eprintln!("warning: {err}");
                continue;
            }
        };

        // Storage faults are fatal; the producer must know the fix was lost
        engine.on_record_produced(&entry.key, &entry.payload)?;
        recorded += 1;
    }

    Ok((recorded, rejected))
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

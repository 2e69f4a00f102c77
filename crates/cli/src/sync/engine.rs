// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Store-and-forward sync engine.
//!
//! The engine owns the drain loop: it reads the pending queue oldest first,
//! delivers each record through a [`RemoteSink`], and deletes a record only
//! after the sink acknowledged it. The first failed delivery ends the pass;
//! the failed record and everything behind it stay queued for the next one.
//!
//! Drains are single-flight. Requests arriving while a drain runs collapse
//! into at most one follow-up pass, so a record enqueued mid-drain is still
//! picked up without piling up redundant passes.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use trail_core::{PersistentQueue, RecordId, TokenSource};

use super::monitor::Connectivity;
use super::sink::{endpoint_for, DeliveryError, HttpSink, RemoteSink};
use crate::error::{Error, Result};

/// Configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncEngineConfig {
    /// Prefix joined with a record key to form its endpoint.
    pub endpoint_prefix: String,
}

impl Default for SyncEngineConfig {
    fn default() -> Self {
        Self {
            endpoint_prefix: "/data/".to_string(),
        }
    }
}

/// Why a drain pass did not touch the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotReady {
    /// No bearer token is stored.
    Unauthenticated,
    /// The collector is not reachable.
    Offline,
}

/// Result of one drain pass.
#[derive(Debug, Clone, PartialEq)]
pub enum DrainOutcome {
    /// Preconditions failed; nothing was read or sent.
    NotReady(NotReady),
    /// The queue was empty.
    Empty,
    /// Every record in the snapshot was delivered and removed.
    Completed { delivered: usize },
    /// A delivery failed; the batch stopped at `failed`.
    Stopped {
        delivered: usize,
        failed: RecordId,
        remaining: usize,
        error: DeliveryError,
    },
}

impl DrainOutcome {
    /// Number of records delivered during the pass.
    pub fn delivered(&self) -> usize {
        match self {
            DrainOutcome::Completed { delivered } | DrainOutcome::Stopped { delivered, .. } => {
                *delivered
            }
            DrainOutcome::NotReady(_) | DrainOutcome::Empty => 0,
        }
    }
}

/// Counters published after every drain pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrainStats {
    /// Passes finished since the engine started, including skipped ones.
    pub passes: u64,
    /// Outcome of the most recent pass, `None` if it hit a storage error.
    pub last: Option<DrainOutcome>,
}

/// Cloneable handle that requests a drain without waiting for it.
#[derive(Clone)]
pub struct DrainTrigger {
    tx: mpsc::Sender<()>,
}

impl DrainTrigger {
    /// Ask for a drain pass.
    ///
    /// Never blocks. While a pass is running, any number of requests collapse
    /// into one follow-up pass.
    pub fn request(&self) {
        match self.tx.try_send(()) {
            Ok(()) => tracing::trace!("drain requested"),
            Err(mpsc::error::TrySendError::Full(())) => {
                tracing::trace!("drain already pending, request coalesced");
            }
            Err(mpsc::error::TrySendError::Closed(())) => {
                tracing::debug!("drain requested after engine shutdown");
            }
        }
    }
}

/// State shared between the engine handle and its worker.
struct EngineCore<S: RemoteSink> {
    queue: Arc<PersistentQueue>,
    sink: S,
    tokens: Arc<dyn TokenSource>,
    connectivity: Arc<dyn Connectivity>,
    config: SyncEngineConfig,
    drain_lock: tokio::sync::Mutex<()>,
    stats: watch::Sender<DrainStats>,
}

impl<S: RemoteSink> EngineCore<S> {
    /// Run one pass while holding the drain lock.
    async fn run_drain(&self) -> Result<DrainOutcome> {
        let _guard = self.drain_lock.lock().await;
        let result = self.drain().await;

        let last = result.as_ref().ok().cloned();
        self.stats.send_modify(|stats| {
            stats.passes += 1;
            stats.last = last;
        });
        result
    }

    async fn drain(&self) -> Result<DrainOutcome> {
        let Some(token) = self.tokens.token() else {
            tracing::debug!("drain skipped: not authenticated");
            return Ok(DrainOutcome::NotReady(NotReady::Unauthenticated));
        };
        if !self.connectivity.is_online() {
            tracing::debug!("drain skipped: offline");
            return Ok(DrainOutcome::NotReady(NotReady::Offline));
        }

        let pending = with_queue(&self.queue, |queue| queue.list_pending()).await?;
        if pending.is_empty() {
            return Ok(DrainOutcome::Empty);
        }

        let total = pending.len();
        tracing::debug!(pending = total, "draining queue");

        let mut delivered = 0;
        for record in &pending {
            let endpoint = endpoint_for(&self.config.endpoint_prefix, &record.key);
            match self.sink.deliver(&endpoint, &record.payload, &token).await {
                Ok(()) => {
                    let id = record.id;
                    with_queue(&self.queue, move |queue| queue.remove(id)).await?;
                    delivered += 1;
                    tracing::debug!(id = record.id, key = %record.key, "record delivered");
                }
                Err(error) => {
                    tracing::warn!(
                        id = record.id,
                        key = %record.key,
                        %error,
                        "delivery failed, keeping record for a later drain"
                    );
                    return Ok(DrainOutcome::Stopped {
                        delivered,
                        failed: record.id,
                        remaining: total - delivered,
                        error,
                    });
                }
            }
        }

        tracing::info!(delivered, "queue drained");
        Ok(DrainOutcome::Completed { delivered })
    }
}

/// Run a queue operation on the blocking pool.
///
/// Queue writes wait on fsync; keeping them off the async workers leaves the
/// reactor free for the monitor and the producer.
async fn with_queue<T, F>(queue: &Arc<PersistentQueue>, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&PersistentQueue) -> trail_core::Result<T> + Send + 'static,
{
    let queue = Arc::clone(queue);
    match tokio::task::spawn_blocking(move || op(&queue)).await {
        Ok(result) => Ok(result?),
        Err(e) => Err(Error::Sync(format!("queue task failed: {e}"))),
    }
}

/// Background worker: one drain per received request.
async fn worker_loop<S: RemoteSink>(
    core: Arc<EngineCore<S>>,
    mut rx: mpsc::Receiver<()>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            request = rx.recv() => {
                if request.is_none() {
                    break;
                }
            }
        }

        // A started pass always runs to completion
        if let Err(e) = core.run_drain().await {
            tracing::error!(error = %e, "drain aborted by storage error");
        }
    }
    tracing::debug!("sync worker stopped");
}

/// Drives delivery of queued records to the collector.
pub struct SyncEngine<S: RemoteSink + 'static = HttpSink> {
    core: Arc<EngineCore<S>>,
    trigger: DrainTrigger,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<S: RemoteSink + 'static> SyncEngine<S> {
    /// Create an engine and spawn its worker.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        queue: Arc<PersistentQueue>,
        sink: S,
        tokens: Arc<dyn TokenSource>,
        connectivity: Arc<dyn Connectivity>,
        config: SyncEngineConfig,
    ) -> Self {
        let (stats, _) = watch::channel(DrainStats::default());
        let core = Arc::new(EngineCore {
            queue,
            sink,
            tokens,
            connectivity,
            config,
            drain_lock: tokio::sync::Mutex::new(()),
            stats,
        });

        // Capacity one: a single queued request stands for any number of
        // requests made while a pass is running
        let (tx, rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        let worker = tokio::spawn(worker_loop(Arc::clone(&core), rx, cancel.clone()));

        Self {
            core,
            trigger: DrainTrigger { tx },
            cancel,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Queue backing this engine.
    pub fn queue(&self) -> &Arc<PersistentQueue> {
        &self.core.queue
    }

    /// Durably enqueue a record, then request a drain.
    ///
    /// Returns once the record is committed; delivery happens in the
    /// background.
    pub fn on_record_produced(&self, key: &str, payload: &Value) -> Result<RecordId> {
        let id = self.core.queue.append(key, payload)?;
        tracing::debug!(id, key, "record enqueued");
        self.trigger.request();
        Ok(id)
    }

    /// Request a background drain without waiting for it.
    pub fn request_drain(&self) {
        self.trigger.request();
    }

    /// Handle for requesting drains from callbacks.
    pub fn trigger(&self) -> DrainTrigger {
        self.trigger.clone()
    }

    /// Run one drain pass now and wait for its outcome.
    ///
    /// Waits for any pass already in flight first.
    pub async fn drain_now(&self) -> Result<DrainOutcome> {
        self.core.run_drain().await
    }

    /// Watch drain statistics.
    pub fn subscribe(&self) -> watch::Receiver<DrainStats> {
        self.core.stats.subscribe()
    }

    /// Current drain statistics.
    pub fn stats(&self) -> DrainStats {
        self.core.stats.borrow().clone()
    }

    /// Stop the worker, letting an in-flight pass finish first.
    ///
    /// Requests still queued are dropped; their records stay in the queue.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "sync worker ended abnormally");
            }
        }
    }
}

impl<S: RemoteSink + 'static> Drop for SyncEngine<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

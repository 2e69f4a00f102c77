// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity monitoring.
//!
//! The monitor keeps a best-effort view of whether the collector is
//! reachable and fires a registered callback on each transition *into* the
//! online state. Observations come from two places:
//! - a background task that polls a [`ReachabilityProbe`]
//! - [`ConnectivityMonitor::observe`], for platform notifiers that push state
//!
//! The first "online" observation after [`start`](ConnectivityMonitor::start)
//! counts as a transition, so a drain runs promptly at startup.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Connectivity state values for atomic state field.
pub const STATE_UNKNOWN: u8 = 0;
pub const STATE_OFFLINE: u8 = 1;
pub const STATE_ONLINE: u8 = 2;

/// Synchronous reachability check consumed by the sync engine.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// One reachability check, e.g. a TCP connect to the collector.
pub trait ReachabilityProbe: Send + Sync {
    fn probe(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}

/// Probe that opens (and immediately drops) a TCP connection.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    /// Probe `addr` (`host:port`), giving up after `timeout`.
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        TcpProbe {
            addr: addr.into(),
            timeout,
        }
    }

    /// Address being probed.
    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl ReachabilityProbe for TcpProbe {
    fn probe(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            matches!(
                tokio::time::timeout(self.timeout, tokio::net::TcpStream::connect(&self.addr))
                    .await,
                Ok(Ok(_))
            )
        })
    }
}

/// Connectivity state visible to the poll task, pushers and the engine.
///
/// Uses an atomic field for lock-free reads from the drain path.
pub struct SharedConnectivityState {
    state: AtomicU8,
}

impl SharedConnectivityState {
    /// Create a new shared state initialized to unknown.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(STATE_UNKNOWN),
        }
    }

    /// Get the current state.
    pub fn get(&self) -> u8 {
        self.state.load(Ordering::Acquire)
    }

    /// Check if currently online.
    pub fn is_online(&self) -> bool {
        self.get() == STATE_ONLINE
    }

    /// Record an observation. Returns true on a transition into online.
    pub fn record(&self, online: bool) -> bool {
        let next = if online { STATE_ONLINE } else { STATE_OFFLINE };
        let prev = self.state.swap(next, Ordering::AcqRel);
        online && prev != STATE_ONLINE
    }

    /// Forget the last observation.
    pub fn reset(&self) {
        self.state.store(STATE_UNKNOWN, Ordering::Release);
    }

    /// Get a human-readable status string.
    pub fn status_string(&self) -> &'static str {
        match self.get() {
            STATE_ONLINE => "online",
            STATE_OFFLINE => "offline",
            _ => "unknown",
        }
    }
}

impl Default for SharedConnectivityState {
    fn default() -> Self {
        Self::new()
    }
}

/// Callback invoked on each offline → online transition.
pub type OnlineCallback = Arc<dyn Fn() + Send + Sync>;

/// Configuration for the connectivity monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Delay between probes.
    pub poll_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
        }
    }
}

/// State shared with the poll task.
struct MonitorShared {
    state: SharedConnectivityState,
    callback: Mutex<Option<OnlineCallback>>,
}

impl MonitorShared {
    fn callback(&self) -> MutexGuard<'_, Option<OnlineCallback>> {
        self.callback.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn observe(&self, online: bool) -> bool {
        if !self.state.record(online) {
            return false;
        }
        // Clone out so the callback runs without the lock held
        let callback = self.callback().clone();
        match callback {
            Some(callback) => {
                tracing::info!("connectivity restored");
                callback();
                true
            }
            None => false,
        }
    }
}

/// Running poll task.
struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Watches reachability and signals transitions into the online state.
pub struct ConnectivityMonitor {
    probe: Arc<dyn ReachabilityProbe>,
    config: MonitorConfig,
    shared: Arc<MonitorShared>,
    task: Mutex<Option<PollTask>>,
}

impl ConnectivityMonitor {
    /// Create a stopped monitor.
    pub fn new(probe: Arc<dyn ReachabilityProbe>, config: MonitorConfig) -> Self {
        Self {
            probe,
            config,
            shared: Arc::new(MonitorShared {
                state: SharedConnectivityState::new(),
                callback: Mutex::new(None),
            }),
            task: Mutex::new(None),
        }
    }

    fn task(&self) -> MutexGuard<'_, Option<PollTask>> {
        self.task.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register `on_online` and start polling.
    ///
    /// Must be called from within a Tokio runtime. Returns false, leaving the
    /// existing registration in place, if the monitor is already running.
    pub fn start<F>(&self, on_online: F) -> bool
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut task = self.task();
        if task.is_some() {
            tracing::debug!("connectivity monitor already running");
            return false;
        }

        *self.shared.callback() = Some(Arc::new(on_online));

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            Arc::clone(&self.probe),
            Arc::clone(&self.shared),
            self.config.poll_interval,
            cancel.clone(),
        ));
        *task = Some(PollTask { cancel, handle });
        tracing::debug!(
            interval_ms = self.config.poll_interval.as_millis() as u64,
            "connectivity monitor started"
        );
        true
    }

    /// Unregister the callback and stop polling.
    ///
    /// Safe to call when never started or already stopped. Does not wait for
    /// anything the callback triggered.
    pub fn stop(&self) {
        let task = self.task().take();
        *self.shared.callback() = None;
        self.shared.state.reset();

        if let Some(task) = task {
            task.cancel.cancel();
            // The task exits at its next await point; nothing to report
            drop(task.handle);
            tracing::debug!("connectivity monitor stopped");
        }
    }

    /// Returns true while the poll task is registered.
    pub fn is_running(&self) -> bool {
        self.task().is_some()
    }

    /// Feed an observation from an external notifier.
    ///
    /// Returns true if this observation fired the callback.
    pub fn observe(&self, online: bool) -> bool {
        self.shared.observe(online)
    }

    /// Probe once now and record the result.
    pub async fn refresh(&self) -> bool {
        let online = self.probe.probe().await;
        self.shared.observe(online);
        online
    }

    /// Human-readable state.
    pub fn status_string(&self) -> &'static str {
        self.shared.state.status_string()
    }
}

impl Connectivity for ConnectivityMonitor {
    fn is_online(&self) -> bool {
        self.shared.state.is_online()
    }
}

impl<T: Connectivity + ?Sized> Connectivity for Arc<T> {
    fn is_online(&self) -> bool {
        (**self).is_online()
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task().take() {
            task.cancel.cancel();
        }
    }
}

/// Background probe loop.
async fn poll_loop(
    probe: Arc<dyn ReachabilityProbe>,
    shared: Arc<MonitorShared>,
    interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        let online = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            online = probe.probe() => online,
        };

        if !cancel.is_cancelled() {
            shared.observe(online);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

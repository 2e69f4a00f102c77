// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Store-and-forward delivery of captured records.
//!
//! Records are committed to the local queue first and shipped to the
//! collector whenever the device is authenticated and reachable.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Producer   │────►│   Engine    │────►│    Sink     │────► collector
//! │ (record/run)│     │(SyncEngine) │     │ (HttpSink)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                 ▲    │
//!        ▼                 │    ▼
//! ┌─────────────┐     ┌─────────────┐
//! │   Queue     │◄────│   Monitor   │  (online edge → drain)
//! │ (SQLite)    │     │(Connectivity│
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Features
//!
//! - Durable append before any network work
//! - Ordered, stop-on-first-failure drains
//! - Single-flight drain worker with request coalescing
//! - Edge-triggered drains on reconnect
//! - Injectable sink, token source and connectivity for testing

mod engine;
mod monitor;
mod sink;

pub use engine::{
    DrainOutcome, DrainStats, DrainTrigger, NotReady, SyncEngine, SyncEngineConfig,
};
pub use monitor::{
    Connectivity, ConnectivityMonitor, MonitorConfig, ReachabilityProbe,
    SharedConnectivityState, TcpProbe,
};
pub use sink::{
    endpoint_for, http_client, join_url, DeliveryError, HttpSink, HttpTimeouts, RemoteSink,
};

#[cfg(test)]
mod test_helpers;


#[cfg(test)]
mod monitor_tests;

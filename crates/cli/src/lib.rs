// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! trailrs - Offline-first GPS fix recording with store-and-forward sync.
//!
//! This crate provides the functionality behind the `trail` CLI: captured
//! fixes are committed to a durable local queue first, then delivered to the
//! collector in capture order whenever the device is authenticated and
//! reachable.
//!
//! # Main Components
//!
//! - [`sync::SyncEngine`] - Ordered, single-flight drain of the pending queue
//! - [`sync::ConnectivityMonitor`] - Edge-triggered reachability watcher
//! - [`sync::HttpSink`] - Delivery of one record to the collector
//! - [`auth::AuthClient`] - Login and registration
//! - [`Config`] - Collector URL, endpoint prefix and timeouts
//! - [`Error`] - Error types for all operations
//!
//! # Example
//!
//! ```rust,ignore
//! use trailrs::sync::{ConnectivityMonitor, SyncEngine};
//!
//! let engine = SyncEngine::new(queue, sink, tokens, monitor.clone(), Default::default());
//! let trigger = engine.trigger();
//! monitor.start(move || trigger.request());
//!
//! engine.on_record_produced("gps:ab12cd34:1700000000000", &payload)?;
//! ```

mod cli;
mod commands;
mod env;

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod sync;

pub use cli::{Cli, Command, FixArgs};
pub use config::{Config, StatePaths};
pub use error::{Error, Result};

/// Resolve the state directory paths for a `--state-dir` flag.
pub fn state_paths(flag: Option<std::path::PathBuf>) -> StatePaths {
    StatePaths::new(config::resolve_state_dir(flag))
}

/// Execute a parsed command line. This is the main entry point for library
/// users and provides a testable way to run commands without process
/// execution.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = commands::Context::load(cli.state_dir, cli.config)?;

    match cli.command {
        Command::Login { username, password } => {
            commands::account::login(&ctx, &username, password)
        }
        Command::Register { username, password } => {
            commands::account::register(&ctx, &username, password)
        }
        Command::Logout => commands::account::logout(&ctx),
        Command::Record(args) => commands::record::run(&ctx, args),
        Command::Sync => commands::sync::run(&ctx),
        Command::Status => commands::status::run(&ctx),
        Command::Pending { json } => commands::pending::run(&ctx, json),
        Command::Run => commands::run::run(&ctx),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

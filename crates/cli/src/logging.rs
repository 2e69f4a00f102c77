// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.
//!
//! `trail run` is long-lived and logs to `<state_dir>/trail.log` at `info`.
//! One-shot commands log to stderr at `warn` so their stdout stays clean.
//! `RUST_LOG` overrides the level in both cases.

use std::fs;

use tracing_subscriber::EnvFilter;

use crate::cli::Command;
use crate::config::StatePaths;

/// Default filter directive for `command`.
pub fn default_level(command: &Command) -> &'static str {
    match command {
        Command::Run => "info",
        _ => "warn",
    }
}

/// Install the global subscriber for `command`.
pub fn init(command: &Command, paths: &StatePaths) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(command)));

    if matches!(command, Command::Run) {
        // Try to open log file, fall back to stderr
        let file = paths.ensure().ok().and_then(|()| {
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(paths.log_file())
                .ok()
        });
        if let Some(file) = file {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .try_init();
            return;
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the trailrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
/// Failed deliveries are not errors at this level: they leave records queued
/// and are reported through [`DrainOutcome`](crate::sync::DrainOutcome).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] trail_core::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("not logged in\n  hint: run 'trail login <username>' first")]
    NotLoggedIn,

    #[error("{field} is required\n  hint: {hint}")]
    FieldRequired {
        field: &'static str,
        hint: &'static str,
    },

    #[error("line {line}: {reason}")]
    ParseLineError { line: usize, reason: String },

    #[error("another tracker is already running (lock held on {0})")]
    AlreadyRunning(String),

    #[error("sync error: {0}")]
    Sync(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for trailrs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

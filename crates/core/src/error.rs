// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for trail-core operations.

use thiserror::Error;

/// All possible errors that can occur in trail-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid location fix: {0}")]
    InvalidFix(String),

    #[error("invalid payload: {0}\n  hint: queued payloads must be JSON objects")]
    InvalidPayload(String),

    #[error("credentials error: {0}")]
    Credentials(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for trail-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

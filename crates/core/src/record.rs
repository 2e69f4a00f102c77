// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! A queued unit of work awaiting delivery.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Store-assigned record identifier.
///
/// Strictly increasing, used only to address deletions. It is never part of
/// what gets delivered.
pub type RecordId = i64;

/// A pending record read back from the queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// Destination key, interpreted by the sink as part of the address.
    pub key: String,
    /// JSON object captured at enqueue time.
    pub payload: Value,
    /// Capture time in milliseconds since Unix epoch. Defines FIFO order.
    pub created_at: i64,
}

impl Record {
    /// Capture time as a UTC timestamp, if it is representable.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.created_at)
    }
}

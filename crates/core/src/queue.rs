// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed persistent queue of records awaiting delivery.
//!
//! Every operation is a single atomic statement (or one transaction), so the
//! producer path and the drain worker can share a [`PersistentQueue`] without
//! any further locking. The connection mutex is only held for the duration of
//! one statement, never across a network call.
//!
//! Durability: the database runs in WAL mode with `synchronous = FULL`, so an
//! [`append`](PersistentQueue::append) that returned has been committed to
//! disk and survives an immediate crash.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::clock::{ClockSource, SystemClock};
use crate::error::{Error, Result};
use crate::record::{Record, RecordId};

/// SQL schema for the pending record queue.
pub const SCHEMA: &str = r#"
-- Records waiting for confirmed delivery, read in capture order
CREATE TABLE IF NOT EXISTS pending_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    key TEXT NOT NULL,
    payload TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

-- Rows whose payload could not be decoded, kept for an operator
CREATE TABLE IF NOT EXISTS quarantined_records (
    id INTEGER PRIMARY KEY,
    key TEXT NOT NULL,
    payload TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    reason TEXT NOT NULL,
    quarantined_at INTEGER NOT NULL
);
"#;

/// Run schema creation on a database connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Decode a stored payload, which must be a JSON object.
fn parse_payload(raw: &str) -> std::result::Result<Value, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) if value.is_object() => Ok(value),
        Ok(_) => Err("payload is not a JSON object".to_string()),
        Err(e) => Err(format!("payload is not valid JSON: {e}")),
    }
}

/// A row as stored, before the payload is decoded.
struct RawRow {
    id: RecordId,
    key: String,
    payload: String,
    created_at: i64,
}

/// Durable FIFO queue of pending records.
pub struct PersistentQueue<C: ClockSource = SystemClock> {
    conn: Mutex<Connection>,
    clock: C,
    path: Option<PathBuf>,
}

impl PersistentQueue<SystemClock> {
    /// Open a queue at the given path, creating the database if needed.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_clock(path, SystemClock)
    }

    /// Open an in-memory queue (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::open_in_memory_with_clock(SystemClock)
    }
}

impl<C: ClockSource> PersistentQueue<C> {
    /// Open a queue at the given path with a custom clock source.
    pub fn open_with_clock(path: &Path, clock: C) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )?;
        run_migrations(&conn)?;

        Ok(PersistentQueue {
            conn: Mutex::new(conn),
            clock,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory queue with a custom clock source (for testing).
    pub fn open_in_memory_with_clock(clock: C) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(PersistentQueue {
            conn: Mutex::new(conn),
            clock,
            path: None,
        })
    }

    /// Path of the backing database, `None` for in-memory queues.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Durably append a record stamped with the current time.
    ///
    /// The stamp never goes below the newest pending record's, so a wall
    /// clock stepping backwards cannot reorder delivery. Returns the id
    /// assigned by the store. The record is committed before this returns.
    pub fn append(&self, key: &str, payload: &Value) -> Result<RecordId> {
        if !payload.is_object() {
            return Err(Error::InvalidPayload(format!(
                "expected an object for key '{key}'"
            )));
        }
        let body = serde_json::to_string(payload)?;
        let created_at = self.clock.now_ms();

        let conn = self.lock();
        conn.execute(
            "INSERT INTO pending_records (key, payload, created_at)
             VALUES (?1, ?2, MAX(?3, COALESCE((SELECT MAX(created_at) FROM pending_records), ?3)))",
            params![key, body, created_at],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Snapshot of all pending records, oldest first.
    ///
    /// Ties on `created_at` are broken by id. Rows whose payload cannot be
    /// decoded are moved to the quarantine table and left out of the result,
    /// so one corrupt row never blocks the rows behind it.
    pub fn list_pending(&self) -> Result<Vec<Record>> {
        let mut conn = self.lock();

        let rows = {
            let mut stmt = conn.prepare(
                "SELECT id, key, payload, created_at FROM pending_records
                 ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(RawRow {
                        id: row.get(0)?,
                        key: row.get(1)?,
                        payload: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        let mut records = Vec::with_capacity(rows.len());
        let mut poisoned = Vec::new();
        for row in rows {
            match parse_payload(&row.payload) {
                Ok(payload) => records.push(Record {
                    id: row.id,
                    key: row.key,
                    payload,
                    created_at: row.created_at,
                }),
                Err(reason) => poisoned.push((row.id, row.key, reason)),
            }
        }

        if !poisoned.is_empty() {
            let now = self.clock.now_ms();
            let tx = conn.transaction()?;
            for (id, key, reason) in &poisoned {
                tracing::warn!(id, key = %key, %reason, "quarantining corrupt record");
                tx.execute(
                    "INSERT OR REPLACE INTO quarantined_records
                         (id, key, payload, created_at, reason, quarantined_at)
                     SELECT id, key, payload, created_at, ?2, ?3
                     FROM pending_records WHERE id = ?1",
                    params![id, reason, now],
                )?;
                tx.execute("DELETE FROM pending_records WHERE id = ?1", params![id])?;
            }
            tx.commit()?;
        }

        Ok(records)
    }

    /// Delete a record after confirmed delivery.
    ///
    /// Returns whether a row was removed; removing an absent id is a no-op.
    pub fn remove(&self, id: RecordId) -> Result<bool> {
        let affected = self
            .lock()
            .execute("DELETE FROM pending_records WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Number of pending records.
    pub fn count(&self) -> Result<usize> {
        let count: i64 =
            self.lock()
                .query_row("SELECT COUNT(*) FROM pending_records", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Number of records moved aside because their payload was corrupt.
    pub fn quarantined_count(&self) -> Result<usize> {
        let count: i64 = self.lock().query_row(
            "SELECT COUNT(*) FROM quarantined_records",
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Capture time of the oldest pending record.
    pub fn oldest_created_at(&self) -> Result<Option<i64>> {
        let oldest = self
            .lock()
            .query_row(
                "SELECT created_at FROM pending_records
                 ORDER BY created_at ASC, id ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(oldest)
    }

    /// Run a raw statement against the backing connection (for testing).
    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<usize> {
        Ok(self.lock().execute(sql, params)?)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Stable device identity.
//!
//! Each installation gets a short random identifier, generated once and kept
//! in the state directory. It is embedded in every record key so the
//! collector can tell devices apart without any hardware identifiers.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// File name of the persisted device id within the state directory.
pub const DEVICE_ID_FILE: &str = "device_id";

/// Returns the device id stored in `state_dir`, creating one if needed.
///
/// Concurrent first calls agree on one id: the new id is written to a
/// private temp file and hard-linked into place, which fails if another
/// process got there first.
pub fn device_id(state_dir: &Path) -> Result<String> {
    let path = state_dir.join(DEVICE_ID_FILE);

    match read_device_id(&path)? {
        Stored::Valid(id) => return Ok(id),
        Stored::Invalid => {
            tracing::warn!(path = %path.display(), "replacing invalid device id");
            remove_if_present(&path)?;
        }
        Stored::Missing => {}
    }

    fs::create_dir_all(state_dir)?;
    let id = generate_device_id(&entropy(state_dir));
    let tmp = state_dir.join(format!("{DEVICE_ID_FILE}.{id}.tmp"));
    fs::write(&tmp, format!("{id}\n"))?;
    let linked = fs::hard_link(&tmp, &path);
    remove_if_present(&tmp)?;

    match linked {
        Ok(()) => Ok(id),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => match read_device_id(&path)? {
            Stored::Valid(existing) => Ok(existing),
            Stored::Missing | Stored::Invalid => Err(Error::Io(e)),
        },
        Err(e) => Err(e.into()),
    }
}

/// Contents of the id file.
enum Stored {
    Missing,
    Invalid,
    Valid(String),
}

fn read_device_id(path: &Path) -> Result<Stored> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let id = contents.trim();
            if is_valid_device_id(id) {
                Ok(Stored::Valid(id.to_string()))
            } else {
                Ok(Stored::Invalid)
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Stored::Missing),
        Err(e) => Err(e.into()),
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Derive an 8 hex char device id from a seed.
pub fn generate_device_id(seed: &str) -> String {
    let hash = Sha256::digest(seed.as_bytes());
    hex::encode(&hash[..4])
}

/// Returns true for non-empty ids made of `[A-Za-z0-9_-]`.
pub fn is_valid_device_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

static SEQ: AtomicU64 = AtomicU64::new(0);

fn entropy(state_dir: &Path) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!(
        "{}:{}:{}:{}",
        std::process::id(),
        seq,
        nanos,
        state_dir.display()
    )
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;

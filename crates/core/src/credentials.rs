// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session credential storage.
//!
//! The sync engine only needs "a bearer token, or nothing". [`TokenSource`]
//! is that contract; [`CredentialStore`] is the file-backed implementation
//! written by `trail login` and read at the start of every drain.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name of the credential file within the state directory.
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// Supplies the current bearer token, if any.
///
/// `None` means "not ready to sync", never an error.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

impl<T: TokenSource + ?Sized> TokenSource for std::sync::Arc<T> {
    fn token(&self) -> Option<String> {
        (**self).token()
    }
}

/// A logged-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

/// Credentials persisted as a small JSON file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store backed by the given file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        CredentialStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store backed by `credentials.json` in a state directory.
    pub fn in_dir(state_dir: &Path) -> Self {
        Self::new(state_dir.join(CREDENTIALS_FILE))
    }

    /// Path of the credential file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored session, `None` when logged out.
    pub fn load(&self) -> Result<Option<Credentials>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let creds: Credentials = serde_json::from_str(&contents)?;
        Ok(Some(creds))
    }

    /// Persists a session, replacing any previous one.
    ///
    /// Written to a temporary file and renamed into place so a reader never
    /// sees a partial file.
    pub fn save(&self, username: &str, token: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(Error::Credentials("refusing to store an empty token".into()));
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let creds = Credentials {
            username: username.to_string(),
            token: token.to_string(),
        };
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&creds)?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Removes the stored session. Clearing when logged out is a no-op.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Username of the stored session.
    pub fn username(&self) -> Result<Option<String>> {
        Ok(self.load()?.map(|c| c.username))
    }

    /// Returns true if a token is stored.
    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }
}

impl TokenSource for CredentialStore {
    fn token(&self) -> Option<String> {
        match self.load() {
            Ok(creds) => creds.map(|c| c.token).filter(|t| !t.trim().is_empty()),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "unreadable credentials");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;

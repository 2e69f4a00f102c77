// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tracker configuration and state directory layout.
//!
//! Configuration is read from `config.toml` in the state directory (or the
//! file named by `--config` / `TRAIL_CONFIG`) and includes:
//! - `server_url`: base URL of the collector
//! - `data_prefix`: path prefix joined with record keys
//! - timeouts for HTTP delivery and the reachability probe
//! - `poll_interval_ms`: how often connectivity is probed
//!
//! A missing default config file means all defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};
use crate::sync::HttpTimeouts;

const STATE_DIR_NAME: &str = "trail";
const CONFIG_FILE_NAME: &str = "config.toml";
const QUEUE_FILE_NAME: &str = "queue.db";
const LOG_FILE_NAME: &str = "trail.log";
const LOCK_FILE_NAME: &str = "trail.lock";

/// Tracker configuration stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the collector, e.g. `https://tracker.example.com`.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Prefix joined with a record key to form its endpoint.
    #[serde(default = "default_data_prefix")]
    pub data_prefix: String,
    /// TCP connect timeout for deliveries and auth calls.
    #[serde(default = "default_http_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Whole-request timeout for deliveries and auth calls.
    #[serde(default = "default_http_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Delay between connectivity probes in `trail run`.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Timeout for one connectivity probe.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// `host:port` to probe. Derived from `server_url` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_addr: Option<String>,
}

fn default_server_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_data_prefix() -> String {
    "/data/".to_string()
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_probe_timeout_ms() -> u64 {
    2_000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_url: default_server_url(),
            data_prefix: default_data_prefix(),
            connect_timeout_ms: default_http_timeout_ms(),
            request_timeout_ms: default_http_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            probe_addr: None,
        }
    }
}

impl Config {
    /// Load configuration from `path`, using defaults if the file is missing.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_existing(path)
    }

    /// Load configuration from a file that must exist.
    pub fn load_existing(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("cannot serialize config: {e}")))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check values that would otherwise fail much later.
    pub fn validate(&self) -> Result<()> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "server_url must start with http:// or https://, got '{}'",
                self.server_url
            )));
        }
        if !self.data_prefix.starts_with('/') {
            return Err(Error::Config(format!(
                "data_prefix must start with '/', got '{}'",
                self.data_prefix
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be positive".into()));
        }
        Ok(())
    }

    /// Timeouts applied to each HTTP request.
    pub fn http_timeouts(&self) -> HttpTimeouts {
        HttpTimeouts {
            connect: Duration::from_millis(self.connect_timeout_ms),
            request: Duration::from_millis(self.request_timeout_ms),
        }
    }

    /// Delay between connectivity probes.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Timeout for one connectivity probe.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Address to probe for reachability.
    pub fn probe_addr(&self) -> Result<String> {
        match &self.probe_addr {
            Some(addr) => Ok(addr.clone()),
            None => derive_probe_addr(&self.server_url),
        }
    }
}

/// Derive `host:port` from an http(s) URL, filling in the scheme's port.
pub fn derive_probe_addr(url: &str) -> Result<String> {
    let (scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| Error::Config(format!("cannot derive probe address from '{url}'")))?;
    let default_port = match scheme {
        "http" => 80,
        "https" => 443,
        other => {
            return Err(Error::Config(format!("unsupported scheme '{other}'")));
        }
    };

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    // Drop any userinfo
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    if host_port.is_empty() {
        return Err(Error::Config(format!("no host in '{url}'")));
    }

    let has_port = if host_port.starts_with('[') {
        host_port.contains("]:")
    } else {
        host_port.contains(':')
    };
    if has_port {
        Ok(host_port.to_string())
    } else {
        Ok(format!("{host_port}:{default_port}"))
    }
}

/// Resolve the state directory.
///
/// Precedence: `--state-dir`, `TRAIL_STATE_DIR`, `$XDG_STATE_HOME/trail`,
/// `~/.local/state/trail`.
pub fn resolve_state_dir(flag: Option<PathBuf>) -> PathBuf {
    state_dir_from(flag, env::state_dir(), env::xdg_state_home(), dirs::home_dir())
}

/// State directory precedence without touching the environment.
pub fn state_dir_from(
    flag: Option<PathBuf>,
    trail_state_dir: Option<PathBuf>,
    xdg_state_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = flag.or(trail_state_dir) {
        return dir;
    }
    if let Some(dir) = xdg_state_home {
        return dir.join(STATE_DIR_NAME);
    }
    home.map(|h| h.join(".local/state").join(STATE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".local/state").join(STATE_DIR_NAME))
}

/// Files kept in the state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    root: PathBuf,
}

impl StatePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        StatePaths { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn queue_db(&self) -> PathBuf {
        self.root.join(QUEUE_FILE_NAME)
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join(LOG_FILE_NAME)
    }

    pub fn lock_file(&self) -> PathBuf {
        self.root.join(LOCK_FILE_NAME)
    }

    /// Create the state directory if needed.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }
}

/// Load the config named by `--config`/`TRAIL_CONFIG`, or the state dir default.
///
/// An explicitly named file must exist.
pub fn load_config(flag: Option<PathBuf>, paths: &StatePaths) -> Result<Config> {
    match flag.or_else(env::config_path) {
        Some(path) => Config::load_existing(&path),
        None => Config::load(&paths.config_file()),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

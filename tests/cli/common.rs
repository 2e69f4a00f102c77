// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test files,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Config pointing at a port nobody listens on, so nothing is delivered.
const OFFLINE_CONFIG: &str = r#"
server_url = "http://127.0.0.1:9"
probe_addr = "127.0.0.1:9"
probe_timeout_ms = 200
connect_timeout_ms = 500
request_timeout_ms = 500
"#;

/// `trail` bound to `temp` as its state directory, with an isolated env.
pub fn trail(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("trail");
    cmd.env("TRAIL_STATE_DIR", temp.path())
        .env_remove("TRAIL_CONFIG")
        .env_remove("TRAIL_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Fresh state directory configured for an unreachable collector.
pub fn offline_state() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.toml"), OFFLINE_CONFIG).unwrap();
    temp
}

/// Record one fix without attempting delivery.
pub fn record(temp: &TempDir, lat: &str, lng: &str, timestamp: &str) {
    trail(temp)
        .args(["record", "--lat", lat, "--lng", lng, "--timestamp", timestamp])
        .arg("--no-sync")
        .assert()
        .success();
}

/// Store a token as if `trail login` had succeeded.
pub fn fake_login(temp: &TempDir, username: &str) {
    std::fs::write(
        temp.path().join("credentials.json"),
        format!(r#"{{"username":"{username}","token":"jwt-test"}}"#),
    )
    .unwrap();
}

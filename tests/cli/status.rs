// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Binary tests for `trail status` and `trail sync`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::*;

#[test]
fn status_on_fresh_state() {
    let temp = offline_state();

    trail(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending: 0"))
        .stdout(predicate::str::contains("User: not logged in"))
        .stdout(predicate::str::contains("Connectivity: offline"))
        .stdout(predicate::str::contains("Oldest pending: none"));
}

#[test]
fn status_counts_pending_records() {
    let temp = offline_state();
    fake_login(&temp, "alice");
    record(&temp, "1", "1", "1700000000000");
    record(&temp, "2", "2", "1700000001000");

    trail(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending: 2"))
        .stdout(predicate::str::contains("User: alice"));
}

#[test]
fn sync_requires_login() {
    let temp = offline_state();
    record(&temp, "1", "1", "1000");

    trail(&temp)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

#[test]
fn sync_offline_fails_and_keeps_records() {
    let temp = offline_state();
    fake_login(&temp, "alice");
    record(&temp, "1", "1", "1000");

    trail(&temp)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Collector unreachable"));

    trail(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending: 1"));
}

#[test]
fn explicit_missing_config_is_an_error() {
    let temp = offline_state();

    trail(&temp)
        .args(["status", "--config"])
        .arg(temp.path().join("missing.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("config error"));
}

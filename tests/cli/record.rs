// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Binary tests for `trail record` and `trail run`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::*;

#[test]
fn record_prints_key_and_queues_fix() {
    let temp = offline_state();

    trail(&temp)
        .args(["record", "--lat", "52.52", "--lng", "13.405", "--no-sync"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Recorded gps:"));

    assert!(temp.path().join("queue.db").exists());
    assert!(temp.path().join("device_id").exists());
}

#[test]
fn record_rejects_out_of_range_latitude() {
    let temp = offline_state();

    trail(&temp)
        .args(["record", "--lat", "91", "--lng", "0", "--no-sync"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid location fix"));
}

#[test]
fn record_keeps_fix_when_not_logged_in() {
    let temp = offline_state();

    trail(&temp)
        .args(["record", "--lat", "1", "--lng", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in; 1 record(s) kept for later"));
}

#[test]
fn record_keeps_fix_when_collector_unreachable() {
    let temp = offline_state();
    fake_login(&temp, "alice");

    trail(&temp)
        .args(["record", "--lat", "1", "--lng", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Collector unreachable; 1 record(s)"));
}

#[test]
fn run_reads_fixes_from_stdin() {
    let temp = offline_state();

    trail(&temp)
        .arg("run")
        .write_stdin(
            "{\"lat\": 1.0, \"lng\": 2.0, \"timestamp_ms\": 1000}\n\
             garbage\n\
             {\"lat\": 3.0, \"lng\": 4.0, \"timestamp_ms\": 2000}\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded 2 fix(es), rejected 1, 2 pending"))
        .stderr(predicate::str::contains("line 2"));

    assert!(temp.path().join("trail.log").exists());
}

#[test]
fn run_refuses_second_instance() {
    use fs2::FileExt;

    let temp = offline_state();
    let lock = std::fs::File::create(temp.path().join("trail.lock")).unwrap();
    lock.lock_exclusive().unwrap();

    trail(&temp)
        .arg("run")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already running"));
}

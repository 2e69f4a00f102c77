// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Binary tests for `trail pending`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::*;

#[test]
fn pending_on_empty_queue() {
    let temp = offline_state();

    trail(&temp)
        .arg("pending")
        .assert()
        .success()
        .stdout("No pending records\n");
}

#[test]
fn pending_lists_in_capture_order() {
    let temp = offline_state();
    record(&temp, "1", "1", "3000");
    record(&temp, "2", "2", "1000");

    let output = trail(&temp).arg("pending").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(":3000"));
    assert!(lines[1].ends_with(":1000"));
}

#[test]
fn pending_json_is_parseable() {
    let temp = offline_state();
    record(&temp, "52.5", "13.4", "1700000000000");

    let output = trail(&temp).args(["pending", "--json"]).output().unwrap();
    assert!(output.status.success());

    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["payload"]["lat"], 52.5);
    assert_eq!(records[0]["payload"]["timestamp"], 1_700_000_000_000_i64);
    assert!(records[0]["key"]
        .as_str()
        .unwrap()
        .ends_with(":1700000000000"));
}

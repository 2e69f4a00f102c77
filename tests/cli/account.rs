// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Binary tests for `trail login`, `trail register` and `trail logout`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::*;

#[test]
fn login_requires_password() {
    let temp = offline_state();

    trail(&temp)
        .args(["login", "alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("password is required"));
}

#[test]
fn login_against_unreachable_server_fails() {
    let temp = offline_state();

    trail(&temp)
        .args(["login", "alice"])
        .env("TRAIL_PASSWORD", "pw")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));

    assert!(!temp.path().join("credentials.json").exists());
}

#[test]
fn logout_removes_credentials() {
    let temp = offline_state();
    fake_login(&temp, "alice");

    trail(&temp)
        .arg("logout")
        .assert()
        .success()
        .stdout("Logged out alice\n");

    assert!(!temp.path().join("credentials.json").exists());
}

#[test]
fn logout_when_logged_out() {
    let temp = offline_state();

    trail(&temp)
        .arg("logout")
        .assert()
        .success()
        .stdout("Not logged in\n");
}

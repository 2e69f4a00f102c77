// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the connectivity monitor.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::monitor::*;
use super::test_helpers::ScriptedProbe;

const POLL: Duration = Duration::from_secs(1);

fn monitor_with(probe: &Arc<ScriptedProbe>, poll_interval: Duration) -> ConnectivityMonitor {
    ConnectivityMonitor::new(
        Arc::clone(probe) as Arc<dyn ReachabilityProbe>,
        MonitorConfig { poll_interval },
    )
}

fn counting_callback() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let inner = Arc::clone(&count);
    (count, move || {
        inner.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn test_shared_state_reports_only_online_edges() {
    let state = SharedConnectivityState::new();
    assert_eq!(state.get(), STATE_UNKNOWN);
    assert_eq!(state.status_string(), "unknown");

    assert!(state.record(true));
    assert!(!state.record(true));
    assert!(state.is_online());

    assert!(!state.record(false));
    assert!(!state.record(false));
    assert_eq!(state.status_string(), "offline");

    assert!(state.record(true));
}

#[test]
fn test_shared_state_unknown_to_offline_is_not_an_edge() {
    let state = SharedConnectivityState::new();
    assert!(!state.record(false));
    assert_eq!(state.get(), STATE_OFFLINE);
}

#[tokio::test(start_paused = true)]
async fn test_first_online_poll_fires_callback() {
    let probe = Arc::new(ScriptedProbe::default());
    probe.set(true);
    let monitor = monitor_with(&probe, POLL);
    let (count, callback) = counting_callback();

    assert!(monitor.start(callback));
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(monitor.is_online());
    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_staying_online_does_not_refire() {
    let probe = Arc::new(ScriptedProbe::default());
    probe.set(true);
    let monitor = monitor_with(&probe, POLL);
    let (count, callback) = counting_callback();

    monitor.start(callback);
    tokio::time::sleep(POLL * 5 + Duration::from_millis(10)).await;

    assert!(probe.calls() >= 5);
    assert_eq!(count.load(Ordering::SeqCst), 1);
    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_each_reconnect_fires_once() {
    let probe = Arc::new(ScriptedProbe::default());
    let monitor = monitor_with(&probe, POLL);
    let (count, callback) = counting_callback();

    monitor.start(callback);
    tokio::time::sleep(POLL * 2).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(!monitor.is_online());

    probe.set(true);
    tokio::time::sleep(POLL * 2).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    probe.set(false);
    tokio::time::sleep(POLL * 2).await;
    assert!(!monitor.is_online());

    probe.set(true);
    tokio::time::sleep(POLL * 2).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_pushed_observation_fires_on_edge() {
    let probe = Arc::new(ScriptedProbe::default());
    let monitor = monitor_with(&probe, Duration::from_secs(3600));
    let (count, callback) = counting_callback();

    monitor.start(callback);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(monitor.status_string(), "offline");

    assert!(monitor.observe(true));
    assert!(!monitor.observe(true));
    assert!(!monitor.observe(false));
    assert!(monitor.observe(true));
    assert_eq!(count.load(Ordering::SeqCst), 2);
    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_stop_prevents_further_triggers() {
    let probe = Arc::new(ScriptedProbe::default());
    let monitor = monitor_with(&probe, POLL);
    let (count, callback) = counting_callback();

    monitor.start(callback);
    tokio::time::sleep(Duration::from_millis(10)).await;
    monitor.stop();
    assert!(!monitor.is_running());

    probe.set(true);
    tokio::time::sleep(POLL * 3).await;
    assert!(!monitor.observe(true));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent_and_safe_before_start() {
    let probe = Arc::new(ScriptedProbe::default());
    probe.set(true);
    let monitor = monitor_with(&probe, POLL);

    monitor.stop();
    monitor.stop();

    let (count, callback) = counting_callback();
    assert!(monitor.start(callback));
    tokio::time::sleep(Duration::from_millis(10)).await;
    monitor.stop();
    monitor.stop();

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(monitor.status_string(), "unknown");
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_stop_fires_again() {
    let probe = Arc::new(ScriptedProbe::default());
    probe.set(true);
    let monitor = monitor_with(&probe, POLL);
    let (count, callback) = counting_callback();
    let callback = Arc::new(callback);

    let first = Arc::clone(&callback);
    monitor.start(move || (*first)());
    tokio::time::sleep(Duration::from_millis(10)).await;
    monitor.stop();

    let second = Arc::clone(&callback);
    monitor.start(move || (*second)());
    tokio::time::sleep(Duration::from_millis(10)).await;
    monitor.stop();

    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_second_start_keeps_first_registration() {
    let probe = Arc::new(ScriptedProbe::default());
    let monitor = monitor_with(&probe, POLL);
    let (first_count, first) = counting_callback();
    let (second_count, second) = counting_callback();

    assert!(monitor.start(first));
    assert!(!monitor.start(second));

    monitor.observe(true);
    assert_eq!(first_count.load(Ordering::SeqCst), 1);
    assert_eq!(second_count.load(Ordering::SeqCst), 0);
    monitor.stop();
}

#[tokio::test]
async fn test_refresh_without_start_records_state() {
    let probe = Arc::new(ScriptedProbe::default());
    let monitor = monitor_with(&probe, POLL);

    assert!(!monitor.refresh().await);
    assert_eq!(monitor.status_string(), "offline");

    probe.set(true);
    assert!(monitor.refresh().await);
    assert!(monitor.is_online());
}

#[tokio::test]
async fn test_tcp_probe_reaches_listener() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let probe = TcpProbe::new(addr.to_string(), Duration::from_secs(1));
    assert_eq!(probe.addr(), addr.to_string());
    assert!(probe.probe().await);
}

#[tokio::test]
async fn test_tcp_probe_fails_on_closed_port() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let probe = TcpProbe::new(addr.to_string(), Duration::from_millis(500));
    assert!(!probe.probe().await);
}

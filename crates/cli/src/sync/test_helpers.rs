// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::{Notify, Semaphore};
use trail_core::TokenSource;

use super::monitor::{Connectivity, ReachabilityProbe};
use super::sink::{DeliveryError, DeliveryFuture, RemoteSink};

/// One call observed by [`ScriptedSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub endpoint: String,
    pub payload: Value,
    pub token: String,
}

/// Blocks deliveries until the test releases them.
pub struct Gate {
    entered: Notify,
    release: Semaphore,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            release: Semaphore::new(0),
        })
    }

    /// Wait until a delivery is parked at the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let `n` parked (or future) deliveries through.
    pub fn release(&self, n: usize) {
        self.release.add_permits(n);
    }
}

/// Sink that records every attempt and fails the endpoints it is told to.
#[derive(Default)]
pub struct ScriptedSink {
    attempts: Mutex<Vec<Attempt>>,
    failures: Mutex<HashMap<String, DeliveryError>>,
    gate: Option<Arc<Gate>>,
}

impl ScriptedSink {
    /// Sink that acknowledges everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose deliveries wait on `gate`.
    pub fn gated(gate: Arc<Gate>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// Fail every delivery to `endpoint` with `error` until cleared.
    pub fn fail(&self, endpoint: &str, error: DeliveryError) {
        self.failures
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), error);
    }

    /// Stop failing `endpoint`.
    pub fn heal(&self, endpoint: &str) {
        self.failures.lock().unwrap().remove(endpoint);
    }

    /// All attempts so far, in call order.
    pub fn attempts(&self) -> Vec<Attempt> {
        self.attempts.lock().unwrap().clone()
    }

    /// Endpoints of all attempts so far.
    pub fn endpoints(&self) -> Vec<String> {
        self.attempts()
            .into_iter()
            .map(|a| a.endpoint)
            .collect()
    }
}

impl RemoteSink for ScriptedSink {
    fn deliver<'a>(
        &'a self,
        endpoint: &'a str,
        payload: &'a Value,
        token: &'a str,
    ) -> DeliveryFuture<'a> {
        Box::pin(async move {
            self.attempts.lock().unwrap().push(Attempt {
                endpoint: endpoint.to_string(),
                payload: payload.clone(),
                token: token.to_string(),
            });

            if let Some(gate) = &self.gate {
                gate.entered.notify_one();
                gate.release.acquire().await.unwrap().forget();
            }

            match self.failures.lock().unwrap().get(endpoint) {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            }
        })
    }
}

/// Token source backed by a settable value.
#[derive(Default)]
pub struct FakeTokens {
    token: Mutex<Option<String>>,
}

impl FakeTokens {
    pub fn with_token(token: &str) -> Self {
        let tokens = Self::default();
        tokens.set(Some(token));
        tokens
    }

    pub fn set(&self, token: Option<&str>) {
        *self.token.lock().unwrap() = token.map(str::to_string);
    }
}

impl TokenSource for FakeTokens {
    fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}

/// Connectivity that the test flips by hand.
#[derive(Default)]
pub struct FakeConnectivity {
    online: AtomicBool,
}

impl FakeConnectivity {
    pub fn online() -> Self {
        let connectivity = Self::default();
        connectivity.set(true);
        connectivity
    }

    pub fn set(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Connectivity for FakeConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Probe that reports a settable answer and counts calls.
#[derive(Default)]
pub struct ScriptedProbe {
    online: AtomicBool,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    pub fn set(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReachabilityProbe for ScriptedProbe {
    fn probe(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.online.load(Ordering::SeqCst)
        })
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote sink abstraction for record delivery.
//!
//! Provides a trait-based delivery layer that enables:
//! - Real HTTP delivery for production
//! - Scripted sinks for unit testing
//!
//! A delivery is one attempt with its own timeout. The engine treats every
//! error variant the same way (stop the batch); the variants exist for logs.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;

/// Error type for a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// Connection could not be established or broke mid-request.
    #[error("transport failed: {0}")]
    Transport(String),

    /// Connect or read timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// The collector rejected the token.
    #[error("unauthorized (status {0})")]
    Unauthorized(u16),

    /// Non-2xx response.
    #[error("server returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// 2xx response whose body is not an acknowledgement.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Result type for delivery attempts.
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Boxed future returned by [`RemoteSink::deliver`].
pub type DeliveryFuture<'a> = Pin<Box<dyn Future<Output = DeliveryResult<()>> + Send + 'a>>;

/// Destination for queued records.
///
/// Implementations must bound each attempt with a timeout and must only
/// return `Ok` once the collector has acknowledged the record.
pub trait RemoteSink: Send + Sync {
    /// Deliver one payload to `endpoint` using `token` as bearer credential.
    fn deliver<'a>(&'a self, endpoint: &'a str, payload: &'a Value, token: &'a str)
        -> DeliveryFuture<'a>;
}

impl<S: RemoteSink + ?Sized> RemoteSink for std::sync::Arc<S> {
    fn deliver<'a>(
        &'a self,
        endpoint: &'a str,
        payload: &'a Value,
        token: &'a str,
    ) -> DeliveryFuture<'a> {
        (**self).deliver(endpoint, payload, token)
    }
}

/// Endpoint for a record key: the fixed prefix followed by the key.
pub fn endpoint_for(prefix: &str, key: &str) -> String {
    format!("{prefix}{key}")
}

/// Timeouts applied to each HTTP delivery.
#[derive(Debug, Clone, Copy)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        HttpTimeouts {
            connect: Duration::from_secs(10),
            request: Duration::from_secs(10),
        }
    }
}

/// Build a reqwest client with the given timeouts.
pub fn http_client(timeouts: HttpTimeouts) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.request)
        .build()
}

/// Join a base URL and an absolute endpoint path.
pub fn join_url(base_url: &str, endpoint: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if endpoint.starts_with('/') {
        format!("{base}{endpoint}")
    } else {
        format!("{base}/{endpoint}")
    }
}

/// Sink that POSTs JSON to the collector over HTTP.
pub struct HttpSink {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSink {
    /// Create a sink for `base_url` with per-request timeouts.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, reqwest::Error> {
        Ok(HttpSink {
            client: http_client(timeouts)?,
            base_url: base_url.to_string(),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, endpoint: &str, payload: &Value, token: &str) -> DeliveryResult<()> {
        let url = join_url(&self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_reqwest_error)?;

        interpret_response(status.as_u16(), &body)
    }
}

impl RemoteSink for HttpSink {
    fn deliver<'a>(
        &'a self,
        endpoint: &'a str,
        payload: &'a Value,
        token: &'a str,
    ) -> DeliveryFuture<'a> {
        Box::pin(self.post(endpoint, payload, token))
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> DeliveryError {
    if e.is_timeout() {
        DeliveryError::Timeout
    } else {
        DeliveryError::Transport(e.to_string())
    }
}

/// Decide whether a response acknowledges the record.
///
/// Only a 2xx status with a JSON body counts. A body of
/// `{"success": false}` is an application-level rejection.
pub fn interpret_response(status: u16, body: &str) -> DeliveryResult<()> {
    if status == 401 || status == 403 {
        return Err(DeliveryError::Unauthorized(status));
    }

    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        let message = parsed
            .as_ref()
            .and_then(|v| v.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| truncate(body, 200));
        return Err(DeliveryError::Status { status, message });
    }

    let Some(value) = parsed else {
        return Err(DeliveryError::MalformedResponse(truncate(body, 200)));
    };
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("success: false");
        return Err(DeliveryError::MalformedResponse(message.to_string()));
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

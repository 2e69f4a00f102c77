// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Account calls against the collector.
//!
//! Login exchanges a username and password for a bearer token; register
//! creates the account and then logs in. Tokens are persisted through the
//! [`CredentialStore`] so the sync engine picks them up at its next drain.

use serde::Serialize;
use serde_json::Value;
use trail_core::CredentialStore;

use crate::error::{Error, Result};
use crate::sync::{http_client, join_url, HttpTimeouts};

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";

#[derive(Serialize)]
struct AuthRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// HTTP client for the collector's auth routes.
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self> {
        Ok(AuthClient {
            client: http_client(timeouts)?,
            base_url: base_url.to_string(),
        })
    }

    /// Exchange credentials for a token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        validate(username, password)?;
        let body = self.post(LOGIN_PATH, username, password).await?;

        body.as_ref()
            .and_then(|v| v.get("token"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Auth(error_message(body.as_ref(), "login failed")))
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        validate(username, password)?;
        let body = self.post(REGISTER_PATH, username, password).await?;

        let accepted = body
            .as_ref()
            .and_then(|v| v.get("success"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if accepted {
            Ok(())
        } else {
            Err(Error::Auth(error_message(
                body.as_ref(),
                "registration failed",
            )))
        }
    }

    /// Log in and persist the token.
    pub async fn login_and_store(
        &self,
        store: &CredentialStore,
        username: &str,
        password: &str,
    ) -> Result<()> {
        let token = self.login(username, password).await?;
        store.save(username, &token)?;
        tracing::info!(username, "logged in");
        Ok(())
    }

    /// Register, then log in and persist the token.
    pub async fn register_and_store(
        &self,
        store: &CredentialStore,
        username: &str,
        password: &str,
    ) -> Result<()> {
        self.register(username, password).await?;
        tracing::info!(username, "account registered");
        self.login_and_store(store, username, password).await
    }

    /// POST credentials and return the JSON body, if any.
    async fn post(&self, path: &str, username: &str, password: &str) -> Result<Option<Value>> {
        let url = join_url(&self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&AuthRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(%url, status = status.as_u16(), "auth response");
        Ok(serde_json::from_str(&text).ok())
    }
}

fn validate(username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(Error::FieldRequired {
            field: "username",
            hint: "pass a non-empty username",
        });
    }
    if password.is_empty() {
        return Err(Error::FieldRequired {
            field: "password",
            hint: "pass --password or set TRAIL_PASSWORD",
        });
    }
    Ok(())
}

/// Prefer the server's `error` field over a generic message.
fn error_message(body: Option<&Value>, fallback: &str) -> String {
    match body {
        Some(value) => value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or(fallback)
            .to_string(),
        None => format!("{fallback}: no usable response from server"),
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;

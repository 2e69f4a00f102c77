// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Account commands: login, register and logout.

use super::{runtime, Context};
use crate::env;
use crate::error::{Error, Result};

/// Use the flag if given, else `TRAIL_PASSWORD`.
pub(crate) fn resolve_password(flag: Option<String>) -> Result<String> {
    flag.or_else(env::password).ok_or(Error::FieldRequired {
        field: "password",
        hint: "pass --password or set TRAIL_PASSWORD",
    })
}

pub fn login(ctx: &Context, username: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password)?;
    let store = ctx.credentials();
    ctx.paths.ensure()?;
    let client = ctx.auth_client()?;

    runtime()?.block_on(client.login_and_store(&store, username, &password))?;
    println!("Logged in as {username}");
    Ok(())
}

pub fn register(ctx: &Context, username: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password)?;
    let store = ctx.credentials();
    ctx.paths.ensure()?;
    let client = ctx.auth_client()?;

    runtime()?.block_on(client.register_and_store(&store, username, &password))?;
    println!("Registered and logged in as {username}");
    Ok(())
}

/// Remove the stored token. Queued records are kept.
pub fn logout(ctx: &Context) -> Result<()> {
    let store = ctx.credentials();
    match store.username()? {
        Some(username) => {
            store.clear()?;
            println!("Logged out {username}");
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

#[cfg(test)]
#[path = "account_tests.rs"]
mod tests;

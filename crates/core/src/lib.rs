// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! trail-core: Shared library for the trail location tracker
//!
//! This crate provides the durable record queue and the data types shared by
//! the sync engine and the `trail` CLI.

pub mod clock;
pub mod credentials;
pub mod error;
pub mod fix;
pub mod identity;
pub mod queue;
pub mod record;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use credentials::{CredentialStore, Credentials, TokenSource};
pub use error::{Error, Result};
pub use fix::{FixEntry, LocationFix};
pub use queue::PersistentQueue;
pub use record::{Record, RecordId};

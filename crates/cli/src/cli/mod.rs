// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

#[derive(Parser)]
#[command(name = "trail")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first GPS fix recorder with store-and-forward sync")]
#[command(
    long_about = "Offline-first GPS fix recorder with store-and-forward sync.\n\n\
    Every fix is committed to a local queue before any network work, then delivered \
    to the collector in capture order whenever the device is logged in and online."
)]
pub struct Cli {
    /// Directory holding the queue, credentials and logs
    #[arg(long = "state-dir", global = true, value_name = "path")]
    pub state_dir: Option<PathBuf>,

    /// Config file (default: <state-dir>/config.toml)
    #[arg(long = "config", global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    // ─────────────────────────────────────────────────────────────────────────
    // Account
    // ─────────────────────────────────────────────────────────────────────────
    /// Log in and store a bearer token
    #[command(after_help = "\
Examples:
  trail login alice                      Prompt-free login using TRAIL_PASSWORD
  trail login alice --password s3cret    Login with an explicit password")]
    Login {
        #[arg(value_parser = non_empty_string)]
        username: String,

        /// Password (default: TRAIL_PASSWORD)
        #[arg(long, short)]
        password: Option<String>,
    },

    /// Create an account, then log in
    Register {
        #[arg(value_parser = non_empty_string)]
        username: String,

        /// Password (default: TRAIL_PASSWORD)
        #[arg(long, short)]
        password: Option<String>,
    },

    /// Forget the stored token
    Logout,

    // ─────────────────────────────────────────────────────────────────────────
    // Capture and sync
    // ─────────────────────────────────────────────────────────────────────────
    /// Record one location fix and try to deliver the queue
    #[command(after_help = "\
Examples:
  trail record --lat 52.52 --lng 13.405
  trail record --lat 52.52 --lng 13.405 --accuracy 4.5 --no-sync")]
    Record(FixArgs),

    /// Deliver pending records now
    Sync,

    /// Show queue, account and connectivity status
    Status,

    /// List pending records, oldest first
    Pending {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Track continuously: read fixes as JSON lines from stdin
    #[command(after_help = "\
Each stdin line is one fix, e.g.:
  {\"lat\": 52.52, \"lng\": 13.405, \"accuracy_m\": 5.0}

Exits on end of input or Ctrl-C, after any in-flight delivery completes.")]
    Run,
}

/// A single location fix from the command line.
#[derive(Args, Debug, Clone)]
pub struct FixArgs {
    /// Latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Horizontal accuracy in meters
    #[arg(long)]
    pub accuracy: Option<f64>,

    /// Altitude in meters
    #[arg(long, allow_hyphen_values = true)]
    pub altitude: Option<f64>,

    /// Speed in meters per second
    #[arg(long)]
    pub speed: Option<f64>,

    /// Bearing in degrees
    #[arg(long)]
    pub bearing: Option<f64>,

    /// Capture time in epoch milliseconds (default: now)
    #[arg(long)]
    pub timestamp: Option<i64>,

    /// Only enqueue; skip the delivery attempt
    #[arg(long)]
    pub no_sync: bool,
}

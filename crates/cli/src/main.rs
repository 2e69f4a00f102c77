// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use trailrs::Cli;

fn main() {
    let cli = Cli::parse();
    trailrs::logging::init(&cli.command, &trailrs::state_paths(cli.state_dir.clone()));

    if let Err(e) = trailrs::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

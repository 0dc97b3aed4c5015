// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use jlxrs::Cli;

fn main() {
    let cli = Cli::parse();
    jlxrs::logging::init();
    if let Err(e) = jlxrs::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

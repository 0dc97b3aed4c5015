// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! jlxrs - command-line access to indexed JSONL files.
//!
//! Wraps [`jlx_core`] for the `jlx` binary: inspect an index, read or sample
//! records by line number, and manage resumable job progress.
//!
//! ```rust,ignore
//! use clap::Parser;
//! use jlxrs::{run, Cli};
//!
//! run(Cli::parse_from(["jlx", "read", "events.jsonl", "42"]))?;
//! ```

mod cli;
mod commands;
mod format;
mod style;

pub mod config;
pub mod error;
pub mod logging;

pub use cli::{Cli, Command, ProgressArgs};
pub use config::Config;
pub use error::{Error, Result};

use commands::Context;

/// Execute a parsed command line. Kept separate from `main` so commands
/// can be driven in-process.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let ctx = Context::new(&config, cli.interval, cli.rebuild);

    match cli.command {
        Command::Info { file, json } => commands::info::run(&ctx, &file, json),
        Command::Read {
            file,
            lines,
            pretty,
        } => commands::read::run(&ctx, &file, &lines, pretty),
        Command::Sample {
            file,
            n,
            seed,
            pretty,
        } => commands::sample::run(&ctx, &file, n, seed, pretty),
        Command::Jobs {
            file,
            json,
            progress_dir,
            prune,
        } => commands::jobs::list(&ctx, &file, progress_dir.as_deref(), json, prune),
        Command::Reset {
            file,
            job_id,
            progress_dir,
        } => commands::jobs::reset(&ctx, &file, progress_dir.as_deref(), &job_id),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

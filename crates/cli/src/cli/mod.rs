// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::style;

pub use args::ProgressArgs;

#[derive(Parser, Debug)]
#[command(name = "jlx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Random access, sampling and resumable jobs for large JSONL files")]
#[command(
    long_about = "Random access, sampling and resumable jobs for large JSONL files.\n\n\
    A sparse line index is kept next to each file as <file>.idx and refreshed \
    automatically when the file changes."
)]
#[command(styles = style::help_styles())]
pub struct Cli {
    /// Config file (default: $JLX_CONFIG, then <config dir>/jlx/config.toml)
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Lines between index checkpoints when building
    #[arg(long, global = true, value_name = "lines", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Ignore any saved index and rebuild it
    #[arg(long, global = true)]
    pub rebuild: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show line count, size and index details
    #[command(after_help = "\
Examples:
  jlx info events.jsonl            Human-readable summary
  jlx info events.jsonl --json     Machine-readable summary")]
    Info {
        /// Path to the JSONL file
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print records by line number (0-indexed)
    #[command(after_help = "\
Examples:
  jlx read events.jsonl 0          First record
  jlx read events.jsonl 10 20 30   Several records, in the order given
  jlx read events.jsonl 5 --pretty Indented output")]
    Read {
        /// Path to the JSONL file
        file: PathBuf,

        /// Line numbers to read
        #[arg(required = true, value_name = "line")]
        lines: Vec<u64>,

        /// Pretty-print each record
        #[arg(long)]
        pretty: bool,
    },

    /// Print a uniform random sample of records
    #[command(after_help = "\
Examples:
  jlx sample events.jsonl 10            Ten random records
  jlx sample events.jsonl 10 --seed 7   Reproducible sample
  jlx sample events.jsonl 3 --pretty    Indented JSON array")]
    Sample {
        /// Path to the JSONL file
        file: PathBuf,

        /// Number of records to sample
        n: u64,

        /// Seed for a reproducible sample
        #[arg(long)]
        seed: Option<u64>,

        /// Print one indented JSON array
        #[arg(long)]
        pretty: bool,
    },

    /// List batch jobs recorded for a file
    Jobs {
        /// Path to the JSONL file
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        progress_dir: ProgressArgs,

        /// Delete completed jobs before listing
        #[arg(long)]
        prune: bool,
    },

    /// Discard a job's progress so it restarts from line 0
    Reset {
        /// Path to the JSONL file
        file: PathBuf,

        /// Job to reset
        job_id: String,

        #[command(flatten)]
        progress_dir: ProgressArgs,
    },
}

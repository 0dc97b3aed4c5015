// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for jlx-core operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::line::FileIdentity;

/// Boxed error produced by a caller-supplied parser or handler.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All possible errors that can occur in jlx-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("line {line} out of range (file has {total_lines} lines)")]
    LineOutOfRange { line: u64, total_lines: u64 },

    #[error("invalid record at line {line}: {source}")]
    Decode {
        line: u64,
        #[source]
        source: BoxError,
    },

    #[error("cannot read source {}: {reason}", path.display())]
    CorruptSource { path: PathBuf, reason: String },

    #[error("invalid checkpoint data: {0}\n  hint: rebuild the index or reset the job")]
    InvalidCheckpoint(String),

    #[error("source changed since job '{job_id}' was checkpointed (expected {expected}, found {actual})\n  hint: reset the job to restart from the beginning")]
    StaleCheckpoint {
        job_id: String,
        expected: FileIdentity,
        actual: FileIdentity,
    },

    #[error("cannot sample {requested} lines from a file with {total_lines} lines")]
    SampleSize { requested: u64, total_lines: u64 },

    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("source {} shrank from {indexed} to {actual} bytes since indexing", path.display())]
    SourceTruncated {
        path: PathBuf,
        indexed: u64,
        actual: u64,
    },

    #[error("invalid job id: '{0}'\n  hint: use letters, digits, '-', '_' or '.'")]
    InvalidJobId(String),

    #[error("batch processor is {actual}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("handler failed at line {line}: {source}")]
    Handler {
        line: u64,
        #[source]
        source: BoxError,
    },

    #[error("{0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for jlx-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

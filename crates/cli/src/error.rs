// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by the `jlx` command line.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] jlx_core::Error),

    #[error("invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config file {}: {reason}", path.display())]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("{failed} of {requested} requested lines could not be read")]
    LinesFailed { failed: usize, requested: usize },

    #[error("job not found: {0}\n  hint: run 'jlx jobs <file>' to list recorded jobs")]
    JobNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for jlxrs operations.
pub type Result<T> = std::result::Result<T, Error>;

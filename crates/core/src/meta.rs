// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Index metadata: what file was indexed, as of when, and where its
//! checkpoints are.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::checkpoint::CheckpointTable;
use crate::line::FileIdentity;

/// Default number of lines between stored checkpoints.
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 100;

/// Everything persisted about one indexed file.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMetadata {
    pub source_path: PathBuf,
    pub source: FileIdentity,
    pub total_lines: u64,
    pub checkpoint_interval: u64,
    pub checkpoints: CheckpointTable,
    pub indexed_at: DateTime<Utc>,
}

impl IndexMetadata {
    /// Metadata for a file with no lines indexed yet.
    pub fn empty(source_path: impl AsRef<Path>, checkpoint_interval: u64) -> Self {
        IndexMetadata {
            source_path: source_path.as_ref().to_path_buf(),
            source: FileIdentity::new(0, 0),
            total_lines: 0,
            checkpoint_interval,
            checkpoints: CheckpointTable::new(),
            indexed_at: Utc::now(),
        }
    }

    /// True when the recorded identity matches the live file exactly.
    pub fn is_fresh(&self, current: &FileIdentity) -> bool {
        self.source == *current
    }
}

#[cfg(test)]
#[path = "meta_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Argument groups shared by several commands.

use std::path::{Path, PathBuf};

use clap::Args;

/// Location of job progress records.
#[derive(Args, Clone, Debug, Default)]
pub struct ProgressArgs {
    /// Progress directory (default: <file>.progress)
    #[arg(long = "progress-dir", value_name = "path")]
    pub dir: Option<PathBuf>,
}

impl ProgressArgs {
    pub fn as_deref(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

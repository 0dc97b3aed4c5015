// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod info;
pub mod jobs;
pub mod read;
pub mod sample;

use std::path::Path;

use jlx_core::{IndexOptions, JsonlIndex};

use crate::config::Config;
use crate::error::Result;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub options: IndexOptions,
    pub rebuild: bool,
}

impl Context {
    pub fn new(config: &Config, interval: Option<u64>, rebuild: bool) -> Self {
        Context {
            options: config.index_options(interval),
            rebuild,
        }
    }

    /// Opens the index for `file`, rebuilding it when asked to.
    pub fn open_index(&self, file: &Path) -> Result<JsonlIndex> {
        let index = if self.rebuild {
            JsonlIndex::build(file, self.options.clone())?
        } else {
            JsonlIndex::open(file, self.options.clone())?
        };
        Ok(index)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! User configuration.
//!
//! Configuration is an optional TOML file:
//! - `checkpoint_interval`: lines between index checkpoints (default 100)
//! - `auto_save`: write the index sidecar after building (default true)
//!
//! The file is looked up at `--config`, then `$JLX_CONFIG`, then
//! `<config dir>/jlx/config.toml`. A missing file means defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use jlx_core::{IndexOptions, DEFAULT_CHECKPOINT_INTERVAL};

use crate::error::{Error, Result};

const CONFIG_ENV: &str = "JLX_CONFIG";
const CONFIG_DIR_NAME: &str = "jlx";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub checkpoint_interval: u64,
    pub auto_save: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            auto_save: true,
        }
    }
}

impl Config {
    /// Loads the config from `explicit`, or the first default location.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match config_path(explicit) {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    /// Parses the file at `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(e.into()),
        };
        let config: Config = toml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            source: e,
        })?;
        if config.checkpoint_interval == 0 {
            return Err(Error::InvalidConfig {
                path: path.to_path_buf(),
                reason: "checkpoint_interval must be at least 1".to_string(),
            });
        }
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Index options for this config, with `interval` taking precedence.
    pub fn index_options(&self, interval: Option<u64>) -> IndexOptions {
        IndexOptions::default()
            .checkpoint_interval(interval.unwrap_or(self.checkpoint_interval))
            .auto_save(self.auto_save)
    }
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

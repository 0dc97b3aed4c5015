// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Caller-owned cache of open indices.
//!
//! There is no process-wide index cache. Whoever creates an
//! [`IndexRegistry`] decides what it holds and when entries are evicted;
//! dropping the registry drops its references.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use crate::index::{IndexOptions, JsonlIndex};
use crate::reader::open_error;

/// Open indices keyed by canonical source path.
#[derive(Debug, Default)]
pub struct IndexRegistry {
    options: IndexOptions,
    indices: HashMap<PathBuf, Arc<JsonlIndex>>,
}

impl IndexRegistry {
    /// A registry opening every index with `options`. A per-index
    /// `index_path` in `options` is ignored.
    pub fn new(options: IndexOptions) -> Self {
        IndexRegistry {
            options: IndexOptions {
                index_path: None,
                ..options
            },
            indices: HashMap::new(),
        }
    }

    /// Returns the cached index for `path`, opening it on first use.
    pub fn get_or_open(&mut self, path: impl AsRef<Path>) -> Result<Arc<JsonlIndex>> {
        let key = canonical(path.as_ref())?;
        if let Some(index) = self.indices.get(&key) {
            return Ok(Arc::clone(index));
        }
        let index = Arc::new(JsonlIndex::open(&key, self.options.clone())?);
        self.indices.insert(key, Arc::clone(&index));
        Ok(index)
    }

    /// Brings the cached index for `path` up to date.
    ///
    /// When the registry holds the only reference the index is updated in
    /// place; otherwise readers still hold the old instance, so a fresh one
    /// is opened and replaces it here.
    pub fn refresh(&mut self, path: impl AsRef<Path>) -> Result<Arc<JsonlIndex>> {
        let key = canonical(path.as_ref())?;
        let index = match self.indices.remove(&key) {
            Some(shared) => match Arc::try_unwrap(shared) {
                Ok(mut index) => {
                    index.update()?;
                    index
                }
                Err(_) => JsonlIndex::open(&key, self.options.clone())?,
            },
            None => JsonlIndex::open(&key, self.options.clone())?,
        };
        let index = Arc::new(index);
        self.indices.insert(key, Arc::clone(&index));
        Ok(index)
    }

    /// Drops the registry's reference to `path`'s index.
    pub fn evict(&mut self, path: impl AsRef<Path>) -> bool {
        let key = canonical(path.as_ref()).unwrap_or_else(|_| path.as_ref().to_path_buf());
        self.indices.remove(&key).is_some()
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        canonical(path.as_ref())
            .map(|key| self.indices.contains_key(&key))
            .unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.indices.clear();
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

fn canonical(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|e| open_error(path, e))
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

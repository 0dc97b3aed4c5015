// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sidecar index persistence.
//!
//! The sidecar is a single compact JSON document:
//!
//! ```text
//! {"format_version":1,"source_path":"...","source_size":123,"source_mtime_ns":...,
//!  "total_lines":10,"checkpoint_interval":3,"indexed_at":"...",
//!  "checkpoints":[[0,0],[3,36],[6,72],[9,108]]}
//! ```
//!
//! Loading never yields a usable-but-wrong index: any malformed, unknown
//! version, or structurally inconsistent document is
//! [`Error::InvalidCheckpoint`].

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::checkpoint::CheckpointTable;
use crate::error::{Error, Result};
use crate::line::FileIdentity;
use crate::meta::IndexMetadata;

/// Sidecar format version written by this crate.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct IndexDocument {
    format_version: u32,
    source_path: PathBuf,
    source_size: u64,
    source_mtime_ns: u64,
    total_lines: u64,
    checkpoint_interval: u64,
    indexed_at: DateTime<Utc>,
    checkpoints: Vec<(u64, u64)>,
}

/// Writes `meta` to `path`, replacing any previous sidecar atomically.
pub fn save(meta: &IndexMetadata, path: &Path) -> Result<()> {
    let doc = IndexDocument {
        format_version: FORMAT_VERSION,
        source_path: meta.source_path.clone(),
        source_size: meta.source.size,
        source_mtime_ns: meta.source.mtime_ns,
        total_lines: meta.total_lines,
        checkpoint_interval: meta.checkpoint_interval,
        indexed_at: meta.indexed_at,
        checkpoints: meta.checkpoints.to_pairs(),
    };
    write_json_atomic(path, &doc)?;
    tracing::debug!(
        path = %path.display(),
        lines = meta.total_lines,
        checkpoints = doc.checkpoints.len(),
        "saved index"
    );
    Ok(())
}

/// Reads and validates a sidecar.
pub fn load(path: &Path) -> Result<IndexMetadata> {
    let doc: IndexDocument = read_json(path)?;

    if doc.format_version != FORMAT_VERSION {
        return Err(Error::InvalidCheckpoint(format!(
            "unsupported index format version {} (expected {FORMAT_VERSION})",
            doc.format_version
        )));
    }

    // Every line holds at least one byte, and a non-empty file has a line.
    if doc.total_lines > doc.source_size || (doc.total_lines == 0) != (doc.source_size == 0) {
        return Err(Error::InvalidCheckpoint(format!(
            "{} lines cannot fit {} bytes",
            doc.total_lines, doc.source_size
        )));
    }

    let checkpoints = CheckpointTable::from_pairs(&doc.checkpoints)?;
    checkpoints.validate_layout(doc.checkpoint_interval, doc.total_lines)?;

    if let Some(last) = checkpoints.last() {
        if last.offset >= doc.source_size {
            return Err(Error::InvalidCheckpoint(format!(
                "checkpoint offset {} at line {} is past end of file ({} bytes)",
                last.offset, last.line, doc.source_size
            )));
        }
    }

    tracing::debug!(path = %path.display(), lines = doc.total_lines, "loaded index");

    Ok(IndexMetadata {
        source_path: doc.source_path,
        source: FileIdentity::new(doc.source_size, doc.source_mtime_ns),
        total_lines: doc.total_lines,
        checkpoint_interval: doc.checkpoint_interval,
        checkpoints,
        indexed_at: doc.indexed_at,
    })
}

/// Parses a JSON document, mapping any shape problem to
/// [`Error::InvalidCheckpoint`]. I/O errors pass through.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::InvalidCheckpoint(format!("{}: {e}", path.display())))
}

/// Writes compact JSON to a temp file beside `path`, fsyncs, then renames
/// over `path`.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = temp_path(path);
    {
        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }
    fs::rename(&tmp, path)?;
    sync_parent(path);
    Ok(())
}

/// Flushes the rename to disk. Best effort: not every platform can open a
/// directory for syncing.
fn sync_parent(path: &Path) {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if let Ok(dir) = File::open(parent) {
        let _ = dir.sync_all();
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Line locations and source file identity.

use std::fmt;
use std::fs::Metadata;
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};

/// Byte range of one line in the source file.
///
/// `byte_length` includes the trailing newline when the line has one, so
/// `byte_offset + byte_length` is the offset of the next line (or EOF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRecord {
    pub line_number: u64,
    pub byte_offset: u64,
    pub byte_length: u64,
}

impl LineRecord {
    pub fn new(line_number: u64, byte_offset: u64, byte_length: u64) -> Self {
        LineRecord {
            line_number,
            byte_offset,
            byte_length,
        }
    }

    /// Offset of the first byte after this line.
    pub fn end_offset(&self) -> u64 {
        self.byte_offset + self.byte_length
    }
}

/// A line read from the source: its location plus its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub record: LineRecord,
    pub bytes: Vec<u8>,
}

impl RawLine {
    pub fn line_number(&self) -> u64 {
        self.record.line_number
    }

    /// The line without its `\n` or `\r\n` terminator.
    pub fn content(&self) -> &[u8] {
        trim_newline(&self.bytes)
    }
}

/// Strips one trailing `\n` (and a preceding `\r`) from a line.
pub fn trim_newline(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}

/// The (size, mtime) pair used to decide whether persisted state still
/// describes a file.
///
/// Content rewrites that keep both the size and the modification time are
/// not detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileIdentity {
    /// File size in bytes.
    pub size: u64,
    /// Modification time in nanoseconds since the Unix epoch (0 if unknown).
    pub mtime_ns: u64,
}

impl FileIdentity {
    pub fn new(size: u64, mtime_ns: u64) -> Self {
        FileIdentity { size, mtime_ns }
    }

    pub fn from_metadata(meta: &Metadata) -> Self {
        let mtime_ns = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        FileIdentity {
            size: meta.len(),
            mtime_ns,
        }
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "size={} mtime_ns={}", self.size, self.mtime_ns)
    }
}

#[cfg(test)]
#[path = "line_tests.rs"]
mod tests;

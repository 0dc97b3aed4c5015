// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fixtures shared by unit tests.

#![allow(clippy::unwrap_used)]

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// The JSON record written for line `n`.
pub fn record(n: u64) -> String {
    format!("{{\"id\":{n},\"name\":\"item-{n}\"}}")
}

/// Writes `count` JSON records to `dir/name`, one per line.
pub fn write_records(dir: &Path, name: &str, count: u64) -> PathBuf {
    let path = dir.join(name);
    let body: String = (0..count).map(|n| record(n) + "\n").collect();
    fs::write(&path, body).unwrap();
    path
}

/// Appends records `from..to` to `path`.
pub fn append_records(path: &Path, from: u64, to: u64) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    for n in from..to {
        writeln!(file, "{}", record(n)).unwrap();
    }
    file.sync_all().unwrap();
}

/// A temp dir holding `events.jsonl` with `count` records.
pub fn temp_jsonl(count: u64) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = write_records(dir.path(), "events.jsonl", count);
    (dir, path)
}

/// Byte ranges of every line, found by a plain linear split.
pub fn linear_lines(bytes: &[u8]) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'\n' {
            lines.push(bytes[start..=i].to_vec());
            start = i + 1;
        }
    }
    if start < bytes.len() {
        lines.push(bytes[start..].to_vec());
    }
    lines
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sparse line-number to byte-offset table.
//!
//! Only every `interval`-th line is stored, plus the last indexed line.
//! Lookups binary-search for the nearest checkpoint at or before a line and
//! the reader scans forward from there, so per-lookup cost is bounded by the
//! interval while memory stays at `total_lines / interval` entries.

use crate::error::{Error, Result};

/// A `(line_number, byte_offset)` scan starting point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub line: u64,
    pub offset: u64,
}

/// Checkpoints sorted by strictly increasing line number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointTable {
    entries: Vec<Checkpoint>,
}

impl CheckpointTable {
    pub fn new() -> Self {
        CheckpointTable::default()
    }

    /// Builds a table from `(line, offset)` pairs, rejecting any ordering
    /// violation.
    pub fn from_pairs(pairs: &[(u64, u64)]) -> Result<Self> {
        let mut table = CheckpointTable::new();
        for &(line, offset) in pairs {
            if let Some(last) = table.last() {
                if line <= last.line {
                    return Err(Error::InvalidCheckpoint(format!(
                        "checkpoint lines not increasing: {} after {}",
                        line, last.line
                    )));
                }
                if offset <= last.offset {
                    return Err(Error::InvalidCheckpoint(format!(
                        "checkpoint offsets not increasing at line {line}: {} after {}",
                        offset, last.offset
                    )));
                }
            }
            table.entries.push(Checkpoint { line, offset });
        }
        Ok(table)
    }

    /// Appends a checkpoint. Lines must arrive in increasing order; a repeat
    /// of the last line is ignored.
    pub(crate) fn push(&mut self, line: u64, offset: u64) {
        match self.entries.last() {
            Some(last) if last.line >= line => {}
            _ => self.entries.push(Checkpoint { line, offset }),
        }
    }

    /// Greatest checkpoint whose line is `<= line`.
    pub fn floor(&self, line: u64) -> Option<Checkpoint> {
        let idx = self.entries.partition_point(|c| c.line <= line);
        idx.checked_sub(1).map(|i| self.entries[i])
    }

    /// Offset recorded for exactly `line`, if it is a checkpoint.
    pub fn get(&self, line: u64) -> Option<u64> {
        self.entries
            .binary_search_by_key(&line, |c| c.line)
            .ok()
            .map(|i| self.entries[i].offset)
    }

    /// Removes every checkpoint at or after `line`.
    pub(crate) fn truncate_from(&mut self, line: u64) {
        let idx = self.entries.partition_point(|c| c.line < line);
        self.entries.truncate(idx);
    }

    pub fn last(&self) -> Option<Checkpoint> {
        self.entries.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Checkpoint> + '_ {
        self.entries.iter().copied()
    }

    pub fn to_pairs(&self) -> Vec<(u64, u64)> {
        self.entries.iter().map(|c| (c.line, c.offset)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks that the table holds exactly the lines a scan with this
    /// interval over `total_lines` lines would record.
    pub fn validate_layout(&self, interval: u64, total_lines: u64) -> Result<()> {
        if interval == 0 {
            return Err(Error::InvalidCheckpoint("checkpoint interval is zero".into()));
        }
        let expected = expected_count(interval, total_lines);
        if self.entries.len() as u64 != expected {
            return Err(Error::InvalidCheckpoint(format!(
                "expected {expected} checkpoints for {total_lines} lines at interval {interval}, found {}",
                self.entries.len()
            )));
        }
        for (i, entry) in self.entries.iter().enumerate() {
            let want = expected_line(i as u64, interval, total_lines);
            if entry.line != want {
                return Err(Error::InvalidCheckpoint(format!(
                    "unexpected checkpoint at line {} (expected line {want})",
                    entry.line
                )));
            }
        }
        if let Some(first) = self.entries.first() {
            if first.offset != 0 {
                return Err(Error::InvalidCheckpoint(format!(
                    "line 0 must start at offset 0, found {}",
                    first.offset
                )));
            }
        }
        Ok(())
    }
}

/// Number of lines a table must contain: every multiple of `interval`
/// below `total_lines`, plus `total_lines - 1` when it is not one.
fn expected_count(interval: u64, total_lines: u64) -> u64 {
    if total_lines == 0 {
        return 0;
    }
    let strides = total_lines.div_ceil(interval);
    if (total_lines - 1) % interval == 0 {
        strides
    } else {
        strides + 1
    }
}

/// Line number of the `i`th entry, for `i < expected_count(..)`.
fn expected_line(i: u64, interval: u64, total_lines: u64) -> u64 {
    match i.checked_mul(interval) {
        Some(line) if line < total_lines => line,
        _ => total_lines.saturating_sub(1),
    }
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;

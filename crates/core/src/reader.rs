// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Positioned line reader over one open file handle.
//!
//! The reader tracks which line its handle currently sits at, so sorted
//! lookups and sequential iteration continue scanning instead of seeking
//! back to a checkpoint for every line.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::line::{LineRecord, RawLine};
use crate::meta::IndexMetadata;

pub(crate) struct LineReader {
    inner: BufReader<File>,
    path: PathBuf,
    /// Line whose first byte the handle is positioned at.
    line: u64,
    offset: u64,
    /// Indexed file size; bytes appended after indexing are not read.
    limit: u64,
}

impl LineReader {
    /// Opens `meta`'s source positioned at line 0.
    pub fn open(meta: &IndexMetadata) -> Result<Self> {
        let path = meta.source_path.clone();
        let file = File::open(&path).map_err(|e| open_error(&path, e))?;
        Ok(LineReader {
            inner: BufReader::new(file),
            path,
            line: 0,
            offset: 0,
            limit: meta.source.size,
        })
    }

    /// Line the next [`read_line`](Self::read_line) returns.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Positions the handle at the start of `target`.
    ///
    /// Continues from the current position when it lies between the nearest
    /// checkpoint and `target`; otherwise seeks to that checkpoint first.
    pub fn seek_line(&mut self, meta: &IndexMetadata, target: u64) -> Result<()> {
        if target >= meta.total_lines {
            return Err(Error::LineOutOfRange {
                line: target,
                total_lines: meta.total_lines,
            });
        }
        let cp = meta.checkpoints.floor(target).ok_or_else(|| {
            Error::InvalidCheckpoint(format!("no checkpoint at or before line {target}"))
        })?;

        if !(cp.line <= self.line && self.line <= target) {
            self.inner.seek(SeekFrom::Start(cp.offset))?;
            self.line = cp.line;
            self.offset = cp.offset;
        }
        while self.line < target {
            self.skip_line()?;
        }
        Ok(())
    }

    /// Reads the line at the current position into a fresh buffer.
    ///
    /// Returns `None` once the indexed end of file is reached.
    pub fn read_line(&mut self) -> Result<Option<RawLine>> {
        let remaining = self.limit.saturating_sub(self.offset);
        if remaining == 0 {
            return Ok(None);
        }
        let mut bytes = Vec::new();
        let n = (&mut self.inner)
            .take(remaining)
            .read_until(b'\n', &mut bytes)?;
        if n == 0 {
            return Err(self.unexpected_eof());
        }
        let record = LineRecord::new(self.line, self.offset, n as u64);
        self.line += 1;
        self.offset += n as u64;
        Ok(Some(RawLine { record, bytes }))
    }

    /// Advances past one line without buffering it.
    fn skip_line(&mut self) -> Result<()> {
        let mut consumed = 0u64;
        loop {
            let remaining = self.limit.saturating_sub(self.offset + consumed);
            let (step, done) = {
                let buf = self.inner.fill_buf()?;
                let window = &buf[..buf.len().min(remaining as usize)];
                match window.iter().position(|&b| b == b'\n') {
                    Some(j) => (j + 1, true),
                    None => (window.len(), window.is_empty()),
                }
            };
            self.inner.consume(step);
            consumed += step as u64;
            if done {
                break;
            }
        }
        if consumed == 0 {
            return Err(self.unexpected_eof());
        }
        self.line += 1;
        self.offset += consumed;
        Ok(())
    }

    fn unexpected_eof(&self) -> Error {
        Error::CorruptSource {
            path: self.path.clone(),
            reason: format!(
                "unexpected end of file at line {} (offset {})",
                self.line, self.offset
            ),
        }
    }
}

pub(crate) fn open_error(path: &Path, err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        Error::SourceNotFound(path.to_path_buf())
    } else {
        Error::CorruptSource {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The line index engine.
//!
//! [`JsonlIndex`] maps line numbers of one line-delimited file to byte
//! ranges through a sparse [`CheckpointTable`](crate::CheckpointTable),
//! persists that table to a sidecar, and keeps it current either by a full
//! [`rebuild`](JsonlIndex::rebuild) or an append-only
//! [`update`](JsonlIndex::update).
//!
//! Read operations take `&self` and each open their own handle, which is
//! released before they return; [`update`](JsonlIndex::update) and
//! [`rebuild`](JsonlIndex::rebuild) take `&mut self`, so mutation can never
//! overlap a read on the same instance. Use [`JsonlIndex::session`] to reuse
//! one handle across many reads.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::codec;
use crate::decode::{DecodePolicy, Decoded};
use crate::error::{BoxError, Error, Result};
use crate::iter::{Lines, ParsedLines, ReaderSlot};
use crate::line::{FileIdentity, LineRecord, RawLine};
use crate::meta::{IndexMetadata, DEFAULT_CHECKPOINT_INTERVAL};
use crate::reader::{open_error, LineReader};
use crate::scan::scan;
use crate::session::{self, ReadSession};

/// Options controlling how an index is built and persisted.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Lines between stored checkpoints. Smaller values use more memory and
    /// scan less per lookup.
    pub checkpoint_interval: u64,
    /// Sidecar location. Defaults to `<source>.idx`.
    pub index_path: Option<PathBuf>,
    /// Save the sidecar after every build or update.
    pub auto_save: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        IndexOptions {
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            index_path: None,
            auto_save: true,
        }
    }
}

impl IndexOptions {
    pub fn checkpoint_interval(mut self, interval: u64) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    pub fn index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.index_path = Some(path.into());
        self
    }

    pub fn auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.checkpoint_interval == 0 {
            return Err(Error::InvalidInput(
                "checkpoint interval must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Returns the default sidecar path for `source`: `<source>.idx`.
pub fn default_index_path(source: &Path) -> PathBuf {
    let mut name = OsString::from(source.as_os_str());
    name.push(".idx");
    PathBuf::from(name)
}

/// Reads the live (size, mtime) identity of `path`.
pub fn file_identity(path: &Path) -> Result<FileIdentity> {
    let meta = fs::metadata(path).map_err(|e| open_error(path, e))?;
    Ok(FileIdentity::from_metadata(&meta))
}

/// Summary of an index, as reported by `jlx info`.
#[derive(Debug, Clone, Serialize)]
pub struct IndexInfo {
    pub source_path: PathBuf,
    pub index_path: PathBuf,
    pub total_lines: u64,
    pub source_size: u64,
    pub checkpoint_interval: u64,
    pub checkpoints: usize,
    pub indexed_at: DateTime<Utc>,
}

/// Sparse line index over one line-delimited file.
#[derive(Debug)]
pub struct JsonlIndex {
    meta: IndexMetadata,
    index_path: PathBuf,
    options: IndexOptions,
}

impl JsonlIndex {
    /// Opens the index for `path`, reusing a fresh sidecar without scanning.
    ///
    /// A missing or stale sidecar (size or mtime differs from the live file)
    /// triggers a full scan. A sidecar that fails validation is reported as
    /// [`Error::InvalidCheckpoint`]; recover with [`JsonlIndex::build`].
    pub fn open(path: impl AsRef<Path>, options: IndexOptions) -> Result<Self> {
        options.validate()?;
        let source = resolve_source(path.as_ref())?;
        let index_path = sidecar_path(&source, &options);

        if index_path.exists() {
            let mut meta = codec::load(&index_path)?;
            let live = file_identity(&source)?;
            if meta.is_fresh(&live) {
                meta.source_path = source;
                tracing::debug!(path = %index_path.display(), "using fresh index");
                return Ok(JsonlIndex {
                    meta,
                    index_path,
                    options,
                });
            }
            tracing::info!(
                path = %source.display(),
                recorded = %meta.source,
                live = %live,
                "index is stale, rebuilding"
            );
        }

        Self::build_at(source, index_path, options)
    }

    /// Builds a new index for `path` with a full scan, ignoring any sidecar.
    pub fn build(path: impl AsRef<Path>, options: IndexOptions) -> Result<Self> {
        options.validate()?;
        let source = resolve_source(path.as_ref())?;
        let index_path = sidecar_path(&source, &options);
        Self::build_at(source, index_path, options)
    }

    fn build_at(source: PathBuf, index_path: PathBuf, options: IndexOptions) -> Result<Self> {
        let meta = scan_full(&source, options.checkpoint_interval)?;
        let index = JsonlIndex {
            meta,
            index_path,
            options,
        };
        if index.options.auto_save {
            index.save()?;
        }
        Ok(index)
    }

    /// Discards the checkpoint table and re-scans the whole file.
    pub fn rebuild(&mut self) -> Result<()> {
        self.meta = scan_full(&self.meta.source_path, self.meta.checkpoint_interval)?;
        if self.options.auto_save {
            self.save()?;
        }
        Ok(())
    }

    /// Indexes lines appended since the last build or update.
    ///
    /// Returns the number of newly discovered lines. Only bytes from the
    /// start of the last indexed line onward are read, so a tail line that
    /// lacked a newline and has since grown is re-measured. If the file
    /// shrank, got older, or changed without growing, the append assumption
    /// does not hold: the index is rebuilt and the full line count returned.
    pub fn update(&mut self) -> Result<u64> {
        let path = self.meta.source_path.clone();
        let file = File::open(&path).map_err(|e| open_error(&path, e))?;
        let live = FileIdentity::from_metadata(&file.metadata()?);
        let recorded = self.meta.source;

        if live == recorded {
            return Ok(0);
        }
        if live.size <= recorded.size || live.mtime_ns < recorded.mtime_ns {
            tracing::warn!(
                path = %path.display(),
                %recorded,
                %live,
                "source was not appended to, rebuilding index"
            );
            drop(file);
            self.rebuild()?;
            return Ok(self.meta.total_lines);
        }

        let old_total = self.meta.total_lines;
        let (start_line, start_offset) = match self.meta.checkpoints.last() {
            Some(cp) => (cp.line, cp.offset),
            None => (0, 0),
        };

        let mut file = file;
        file.seek(SeekFrom::Start(start_offset))?;
        let mut reader = BufReader::new(file.take(live.size - start_offset));
        let mut table = self.meta.checkpoints.clone();
        table.truncate_from(start_line);
        let summary = scan(
            &mut reader,
            start_line,
            start_offset,
            self.meta.checkpoint_interval,
            &mut table,
        )
        .map_err(|e| scan_error(&path, e))?;
        check_scanned_size(&path, summary.end_offset, live.size)?;

        self.meta.checkpoints = table;
        self.meta.total_lines = summary.total_lines;
        self.meta.source = live;
        self.meta.indexed_at = Utc::now();

        let added = summary.total_lines.saturating_sub(old_total);
        tracing::debug!(
            path = %path.display(),
            added,
            bytes = live.size - recorded.size,
            "indexed appended lines"
        );
        if self.options.auto_save {
            self.save()?;
        }
        Ok(added)
    }

    /// Writes the sidecar.
    pub fn save(&self) -> Result<()> {
        codec::save(&self.meta, &self.index_path)
    }

    pub fn total_lines(&self) -> u64 {
        self.meta.total_lines
    }

    pub fn source_path(&self) -> &Path {
        &self.meta.source_path
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// The identity the index was built against.
    pub fn identity(&self) -> FileIdentity {
        self.meta.source
    }

    pub fn metadata(&self) -> &IndexMetadata {
        &self.meta
    }

    /// True when the live file still matches the indexed identity.
    pub fn is_fresh(&self) -> Result<bool> {
        Ok(self.meta.is_fresh(&file_identity(&self.meta.source_path)?))
    }

    pub fn info(&self) -> IndexInfo {
        IndexInfo {
            source_path: self.meta.source_path.clone(),
            index_path: self.index_path.clone(),
            total_lines: self.meta.total_lines,
            source_size: self.meta.source.size,
            checkpoint_interval: self.meta.checkpoint_interval,
            checkpoints: self.meta.checkpoints.len(),
            indexed_at: self.meta.indexed_at,
        }
    }

    /// Opens a handle that stays open until the session is dropped.
    pub fn session(&self) -> Result<ReadSession<'_>> {
        ReadSession::new(&self.meta)
    }

    fn reader(&self) -> Result<LineReader> {
        LineReader::open(&self.meta)
    }

    /// Byte range of `line`, found by scanning forward from the nearest
    /// checkpoint.
    pub fn resolve(&self, line: u64) -> Result<LineRecord> {
        Ok(self.read_line(line)?.record)
    }

    /// Raw bytes of `line`, including its newline if it has one.
    pub fn read(&self, line: u64) -> Result<Vec<u8>> {
        Ok(self.read_line(line)?.bytes)
    }

    /// Location and bytes of `line`.
    pub fn read_line(&self, line: u64) -> Result<RawLine> {
        self.check_line(line)?;
        session::read_at(&self.meta, &mut self.reader()?, line)
    }

    /// Parses `line` with `parse`. `Ok(None)` means the record was skipped
    /// under [`DecodePolicy::Skip`].
    pub fn read_parsed<T, E, F>(
        &self,
        line: u64,
        parse: F,
        policy: DecodePolicy,
    ) -> Result<Option<Decoded<T>>>
    where
        F: Fn(&[u8]) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        self.check_line(line)?;
        session::read_parsed_at(&self.meta, &mut self.reader()?, line, &parse, policy)
    }

    /// Reads several lines through one handle, returning them in the order
    /// requested. Lines are visited in file order internally.
    pub fn read_many(&self, lines: &[u64]) -> Result<Vec<RawLine>> {
        for &line in lines {
            self.check_line(line)?;
        }
        if lines.is_empty() {
            return Ok(Vec::new());
        }
        session::read_many_with(&self.meta, &mut self.reader()?, lines)
    }

    /// [`read_many`](Self::read_many) followed by `parse`; one entry per
    /// requested line, `None` where a record was skipped.
    pub fn read_many_parsed<T, E, F>(
        &self,
        lines: &[u64],
        parse: F,
        policy: DecodePolicy,
    ) -> Result<Vec<Option<Decoded<T>>>>
    where
        F: Fn(&[u8]) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        session::decode_all(self.read_many(lines)?, &parse, policy)
    }

    /// Iterates lines from `start`, at most `limit` of them. Starting at or
    /// past the end yields nothing.
    pub fn iterate_from(&self, start: u64, limit: Option<u64>) -> Result<Lines<'_>> {
        let reader = self.reader()?;
        Ok(Lines::new(&self.meta, ReaderSlot::Owned(reader), start, limit))
    }

    /// [`iterate_from`](Self::iterate_from) with each line parsed.
    pub fn iterate_parsed<T, E, F>(
        &self,
        start: u64,
        limit: Option<u64>,
        parse: F,
        policy: DecodePolicy,
    ) -> Result<ParsedLines<'_, F, T, E>>
    where
        F: Fn(&[u8]) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        Ok(self.iterate_from(start, limit)?.parsed(parse, policy))
    }

    /// Picks `n` distinct line numbers uniformly from `[0, total_lines)`.
    ///
    /// The same `(total_lines, n, seed)` always gives the same lines in the
    /// same order; without a seed the system entropy source is used.
    pub fn sample_lines(&self, n: u64, seed: Option<u64>) -> Result<Vec<u64>> {
        let total = self.meta.total_lines;
        if n > total {
            return Err(Error::SampleSize {
                requested: n,
                total_lines: total,
            });
        }
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let picked = rand::seq::index::sample(&mut rng, to_usize(total)?, to_usize(n)?);
        Ok(picked.into_iter().map(|i| i as u64).collect())
    }

    /// Reads `n` randomly sampled lines.
    pub fn sample(&self, n: u64, seed: Option<u64>) -> Result<Vec<RawLine>> {
        let lines = self.sample_lines(n, seed)?;
        self.read_many(&lines)
    }

    /// Reads and parses `n` randomly sampled lines.
    pub fn sample_parsed<T, E, F>(
        &self,
        n: u64,
        seed: Option<u64>,
        parse: F,
        policy: DecodePolicy,
    ) -> Result<Vec<Option<Decoded<T>>>>
    where
        F: Fn(&[u8]) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        let lines = self.sample_lines(n, seed)?;
        self.read_many_parsed(&lines, parse, policy)
    }

    fn check_line(&self, line: u64) -> Result<()> {
        if line >= self.meta.total_lines {
            return Err(Error::LineOutOfRange {
                line,
                total_lines: self.meta.total_lines,
            });
        }
        Ok(())
    }
}

fn resolve_source(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|e| open_error(path, e))
}

fn sidecar_path(source: &Path, options: &IndexOptions) -> PathBuf {
    options
        .index_path
        .clone()
        .unwrap_or_else(|| default_index_path(source))
}

/// Full scan of `path` from offset 0.
fn scan_full(path: &Path, interval: u64) -> Result<IndexMetadata> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let identity = FileIdentity::from_metadata(&file.metadata()?);
    let mut reader = BufReader::new(file.take(identity.size));
    let mut meta = IndexMetadata::empty(path, interval);

    let summary = scan(&mut reader, 0, 0, interval, &mut meta.checkpoints)
        .map_err(|e| scan_error(path, e))?;
    check_scanned_size(path, summary.end_offset, identity.size)?;

    meta.total_lines = summary.total_lines;
    meta.source = identity;
    tracing::info!(
        path = %path.display(),
        lines = meta.total_lines,
        bytes = identity.size,
        checkpoints = meta.checkpoints.len(),
        "built index"
    );
    Ok(meta)
}

fn scan_error(path: &Path, err: std::io::Error) -> Error {
    Error::CorruptSource {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

fn check_scanned_size(path: &Path, scanned: u64, expected: u64) -> Result<()> {
    if scanned != expected {
        return Err(Error::CorruptSource {
            path: path.to_path_buf(),
            reason: format!("read {scanned} bytes, expected {expected}; file shrank during scan"),
        });
    }
    Ok(())
}

fn to_usize(n: u64) -> Result<usize> {
    usize::try_from(n).map_err(|_| Error::InvalidInput(format!("{n} exceeds platform limits")))
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;

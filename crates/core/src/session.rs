// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent-handle reads.
//!
//! A [`ReadSession`] owns one open handle for as long as it lives; every read
//! through it reuses that handle. The handle is closed when the session is
//! dropped, including when an error unwinds the caller's scope.

use crate::decode::{decode_line, DecodePolicy, Decoded};
use crate::error::{BoxError, Error, Result};
use crate::iter::{Lines, ReaderSlot};
use crate::line::{LineRecord, RawLine};
use crate::meta::IndexMetadata;
use crate::reader::LineReader;

/// Reads against one index through a single long-lived handle.
pub struct ReadSession<'a> {
    meta: &'a IndexMetadata,
    reader: LineReader,
}

impl<'a> ReadSession<'a> {
    pub(crate) fn new(meta: &'a IndexMetadata) -> Result<Self> {
        Ok(ReadSession {
            meta,
            reader: LineReader::open(meta)?,
        })
    }

    pub fn resolve(&mut self, line: u64) -> Result<LineRecord> {
        Ok(read_at(self.meta, &mut self.reader, line)?.record)
    }

    pub fn read(&mut self, line: u64) -> Result<Vec<u8>> {
        Ok(read_at(self.meta, &mut self.reader, line)?.bytes)
    }

    pub fn read_line(&mut self, line: u64) -> Result<RawLine> {
        read_at(self.meta, &mut self.reader, line)
    }

    pub fn read_parsed<T, E, F>(
        &mut self,
        line: u64,
        parse: F,
        policy: DecodePolicy,
    ) -> Result<Option<Decoded<T>>>
    where
        F: Fn(&[u8]) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        read_parsed_at(self.meta, &mut self.reader, line, &parse, policy)
    }

    pub fn read_many(&mut self, lines: &[u64]) -> Result<Vec<RawLine>> {
        read_many_with(self.meta, &mut self.reader, lines)
    }

    /// Iterates from `start` over the session's handle. The session resumes
    /// from wherever the iterator leaves the handle.
    pub fn iterate_from(&mut self, start: u64, limit: Option<u64>) -> Lines<'_> {
        Lines::new(
            self.meta,
            ReaderSlot::Borrowed(&mut self.reader),
            start,
            limit,
        )
    }

    /// Closes the handle. Equivalent to dropping the session.
    pub fn close(self) {}
}

pub(crate) fn read_at(meta: &IndexMetadata, reader: &mut LineReader, line: u64) -> Result<RawLine> {
    reader.seek_line(meta, line)?;
    reader.read_line()?.ok_or_else(|| Error::CorruptSource {
        path: meta.source_path.clone(),
        reason: format!("line {line} missing from source"),
    })
}

pub(crate) fn read_parsed_at<T, E, F>(
    meta: &IndexMetadata,
    reader: &mut LineReader,
    line: u64,
    parse: &F,
    policy: DecodePolicy,
) -> Result<Option<Decoded<T>>>
where
    F: Fn(&[u8]) -> std::result::Result<T, E>,
    E: Into<BoxError>,
{
    decode_line(read_at(meta, reader, line)?, parse, policy)
}

/// Reads `lines` in ascending order, then reassembles them in request order.
pub(crate) fn read_many_with(
    meta: &IndexMetadata,
    reader: &mut LineReader,
    lines: &[u64],
) -> Result<Vec<RawLine>> {
    let mut order: Vec<usize> = (0..lines.len()).collect();
    order.sort_by_key(|&i| lines[i]);

    let mut slots: Vec<Option<RawLine>> = vec![None; lines.len()];
    let mut previous: Option<(u64, usize)> = None;
    for i in order {
        let line = lines[i];
        let raw = match previous {
            Some((prev_line, prev_idx)) if prev_line == line => slots[prev_idx].clone(),
            _ => Some(read_at(meta, reader, line)?),
        };
        slots[i] = raw;
        previous = Some((line, i));
    }
    Ok(slots.into_iter().flatten().collect())
}

pub(crate) fn decode_all<T, E, F>(
    lines: Vec<RawLine>,
    parse: &F,
    policy: DecodePolicy,
) -> Result<Vec<Option<Decoded<T>>>>
where
    F: Fn(&[u8]) -> std::result::Result<T, E>,
    E: Into<BoxError>,
{
    lines
        .into_iter()
        .map(|line| decode_line(line, parse, policy))
        .collect()
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

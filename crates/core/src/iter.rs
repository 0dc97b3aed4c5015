// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sequential line iteration from an arbitrary starting line.

use std::marker::PhantomData;

use crate::decode::{decode_line, DecodePolicy, Decoded};
use crate::error::{BoxError, Error, Result};
use crate::line::RawLine;
use crate::meta::IndexMetadata;
use crate::reader::LineReader;

/// Either a handle owned by the iterator or one borrowed from a session.
pub(crate) enum ReaderSlot<'a> {
    Owned(LineReader),
    Borrowed(&'a mut LineReader),
}

impl ReaderSlot<'_> {
    fn get(&mut self) -> &mut LineReader {
        match self {
            ReaderSlot::Owned(reader) => reader,
            ReaderSlot::Borrowed(reader) => &mut **reader,
        }
    }
}

/// Lazy iterator over raw lines.
///
/// The start line is located once through the checkpoint table; later lines
/// are read sequentially. An owned handle is closed when the iterator is
/// dropped, whether or not it was exhausted. After an error the iterator
/// yields nothing further.
pub struct Lines<'a> {
    meta: &'a IndexMetadata,
    reader: ReaderSlot<'a>,
    next: u64,
    end: u64,
    positioned: bool,
}

impl<'a> Lines<'a> {
    pub(crate) fn new(
        meta: &'a IndexMetadata,
        reader: ReaderSlot<'a>,
        start: u64,
        limit: Option<u64>,
    ) -> Self {
        let end = match limit {
            Some(limit) => start.saturating_add(limit).min(meta.total_lines),
            None => meta.total_lines,
        };
        Lines {
            meta,
            reader,
            next: start.min(end),
            end,
            positioned: false,
        }
    }

    /// Line number the next item will carry.
    pub fn position(&self) -> u64 {
        self.next
    }

    /// Lines left before the iterator is exhausted.
    pub fn remaining(&self) -> u64 {
        self.end - self.next
    }

    /// Applies `parse` to every line under `policy`.
    pub fn parsed<T, E, F>(self, parse: F, policy: DecodePolicy) -> ParsedLines<'a, F, T, E>
    where
        F: Fn(&[u8]) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        ParsedLines {
            lines: self,
            parse,
            policy,
            _marker: PhantomData,
        }
    }

    fn advance(&mut self) -> Result<RawLine> {
        let meta = self.meta;
        let reader = self.reader.get();
        if !self.positioned {
            reader.seek_line(meta, self.next)?;
            self.positioned = true;
        }
        match reader.read_line()? {
            Some(line) => Ok(line),
            None => Err(Error::CorruptSource {
                path: meta.source_path.clone(),
                reason: format!("line {} missing from source", self.next),
            }),
        }
    }
}

impl Iterator for Lines<'_> {
    type Item = Result<RawLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        match self.advance() {
            Ok(line) => {
                self.next += 1;
                Some(Ok(line))
            }
            Err(err) => {
                self.next = self.end;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining()).unwrap_or(usize::MAX);
        (0, Some(remaining))
    }
}

/// Lines decoded by a caller-supplied parser; skipped records are omitted.
pub struct ParsedLines<'a, F, T, E> {
    lines: Lines<'a>,
    parse: F,
    policy: DecodePolicy,
    _marker: PhantomData<fn() -> (T, E)>,
}

impl<F, T, E> ParsedLines<'_, F, T, E> {
    pub fn position(&self) -> u64 {
        self.lines.position()
    }
}

impl<F, T, E> Iterator for ParsedLines<'_, F, T, E>
where
    F: Fn(&[u8]) -> std::result::Result<T, E>,
    E: Into<BoxError>,
{
    type Item = Result<(u64, Decoded<T>)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err)),
            };
            let number = line.line_number();
            match decode_line(line, &self.parse, self.policy) {
                Ok(Some(value)) => return Some(Ok((number, value))),
                Ok(None) => continue,
                Err(err) => {
                    self.lines.next = self.lines.end;
                    return Some(Err(err));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "iter_tests.rs"]
mod tests;

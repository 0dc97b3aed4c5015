// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pluggable record parsing and the decode-error policy.
//!
//! Indexing is content-agnostic; records are only parsed when a caller asks
//! for them, through any `Fn(&[u8]) -> Result<T, E>`. Parsers receive the
//! line without its newline terminator.

use serde::de::DeserializeOwned;

use crate::error::{BoxError, Error, Result};
use crate::line::RawLine;

/// What to do when a record fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Fail with [`Error::Decode`].
    #[default]
    Raise,
    /// Drop the record.
    Skip,
    /// Hand back the raw bytes as [`Decoded::Raw`].
    ReturnRaw,
}

/// A parsed record, or the raw line when parsing failed under
/// [`DecodePolicy::ReturnRaw`].
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    Parsed(T),
    Raw(Vec<u8>),
}

impl<T> Decoded<T> {
    pub fn parsed(self) -> Option<T> {
        match self {
            Decoded::Parsed(value) => Some(value),
            Decoded::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Decoded::Raw(_))
    }
}

/// JSON parse function for use with the `*_parsed` readers.
pub fn json<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
    serde_json::from_slice(bytes)
}

/// Applies `parse` to one line under `policy`. `Ok(None)` means skipped.
pub(crate) fn decode_line<T, E, F>(
    line: RawLine,
    parse: &F,
    policy: DecodePolicy,
) -> Result<Option<Decoded<T>>>
where
    F: Fn(&[u8]) -> std::result::Result<T, E>,
    E: Into<BoxError>,
{
    match parse(line.content()) {
        Ok(value) => Ok(Some(Decoded::Parsed(value))),
        Err(err) => match policy {
            DecodePolicy::Raise => Err(Error::Decode {
                line: line.line_number(),
                source: err.into(),
            }),
            DecodePolicy::Skip => {
                tracing::debug!(line = line.line_number(), "skipping undecodable record");
                Ok(None)
            }
            DecodePolicy::ReturnRaw => Ok(Some(Decoded::Raw(line.bytes))),
        },
    }
}

#[cfg(test)]
#[path = "decode_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Async adaptation of the synchronous reader.
//!
//! No I/O here is non-blocking. Each call moves the stream's single file
//! handle onto tokio's blocking pool, reads up to `batch_size` lines there,
//! and moves the handle back, so scheduling cost is paid once per batch and
//! lines arrive in file order.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::index::{file_identity, JsonlIndex};
use crate::line::RawLine;
use crate::reader::LineReader;

/// Where an [`AsyncLines`] stream starts and how much it reads per offload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    pub start_line: u64,
    /// Lines read per blocking-pool hop.
    pub batch_size: usize,
    /// Lines to skip after `start_line`.
    pub skip: u64,
    /// Maximum number of lines to yield.
    pub limit: Option<u64>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        StreamOptions {
            start_line: 0,
            batch_size: 100,
            skip: 0,
            limit: None,
        }
    }
}

/// Batched async line stream over a shared index.
///
/// Dropping the stream closes its handle; a batch in flight on the blocking
/// pool closes it when that batch finishes.
pub struct AsyncLines {
    index: Arc<JsonlIndex>,
    reader: Option<LineReader>,
    next: u64,
    end: u64,
    batch_size: usize,
    buffer: VecDeque<RawLine>,
    yielded: u64,
    positioned: bool,
    initial_size: u64,
}

impl AsyncLines {
    /// Opens a stream, failing if the source is gone or has shrunk below
    /// its indexed size.
    pub async fn open(index: Arc<JsonlIndex>, options: StreamOptions) -> Result<Self> {
        let shared = Arc::clone(&index);
        let (reader, initial_size) = offload(move || {
            let live = file_identity(shared.source_path())?;
            let indexed = shared.identity().size;
            if live.size < indexed {
                return Err(Error::SourceTruncated {
                    path: shared.source_path().to_path_buf(),
                    indexed,
                    actual: live.size,
                });
            }
            Ok((LineReader::open(shared.metadata())?, live.size))
        })
        .await?;

        let total = index.total_lines();
        let next = options.start_line.saturating_add(options.skip).min(total);
        let end = match options.limit {
            Some(limit) => next.saturating_add(limit).min(total),
            None => total,
        };
        Ok(AsyncLines {
            index,
            reader: Some(reader),
            next,
            end,
            batch_size: options.batch_size.max(1),
            buffer: VecDeque::new(),
            yielded: 0,
            positioned: false,
            initial_size,
        })
    }

    /// Next line, reading a new batch when the buffer runs dry.
    pub async fn next(&mut self) -> Result<Option<RawLine>> {
        if self.buffer.is_empty() {
            match self.read_batch().await? {
                Some(batch) => self.buffer.extend(batch),
                None => return Ok(None),
            }
        }
        let line = self.buffer.pop_front();
        if line.is_some() {
            self.yielded += 1;
        }
        Ok(line)
    }

    /// Next batch of up to `batch_size` lines, in order. Lines already
    /// buffered by [`next`](Self::next) are returned first.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<RawLine>>> {
        let batch = if self.buffer.is_empty() {
            self.read_batch().await?
        } else {
            Some(self.buffer.drain(..).collect())
        };
        if let Some(lines) = &batch {
            self.yielded += lines.len() as u64;
        }
        Ok(batch)
    }

    /// Line number of the next line to be yielded.
    pub fn position(&self) -> u64 {
        self.next - self.buffer.len() as u64
    }

    pub fn yielded_count(&self) -> u64 {
        self.yielded
    }

    /// File size observed when the stream was opened.
    pub fn initial_file_size(&self) -> u64 {
        self.initial_size
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    /// Releases the handle; later calls yield nothing.
    pub fn close(&mut self) {
        self.reader = None;
        self.buffer.clear();
        self.next = self.end;
    }

    async fn read_batch(&mut self) -> Result<Option<Vec<RawLine>>> {
        if self.next >= self.end {
            self.reader = None;
            return Ok(None);
        }
        let Some(mut reader) = self.reader.take() else {
            return Ok(None);
        };
        let index = Arc::clone(&self.index);
        let start = self.next;
        let count = (self.end - start).min(self.batch_size as u64);
        let seek = !self.positioned;

        let (reader, result) = tokio::task::spawn_blocking(move || {
            let result = read_run(&index, &mut reader, start, count, seek);
            (reader, result)
        })
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        let lines = result?;
        self.reader = Some(reader);
        self.positioned = true;
        self.next += lines.len() as u64;
        Ok(Some(lines))
    }
}

fn read_run(
    index: &JsonlIndex,
    reader: &mut LineReader,
    start: u64,
    count: u64,
    seek: bool,
) -> Result<Vec<RawLine>> {
    let meta = index.metadata();
    if seek {
        reader.seek_line(meta, start)?;
    }
    let mut lines = Vec::with_capacity(count as usize);
    for _ in 0..count {
        match reader.read_line()? {
            Some(line) => lines.push(line),
            None => {
                return Err(Error::CorruptSource {
                    path: meta.source_path.clone(),
                    reason: format!("line {} missing from source", reader.line()),
                })
            }
        }
    }
    Ok(lines)
}

/// Runs `read_many` on the blocking pool.
pub async fn read_many_async(index: Arc<JsonlIndex>, lines: Vec<u64>) -> Result<Vec<RawLine>> {
    offload(move || index.read_many(&lines)).await
}

async fn offload<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;

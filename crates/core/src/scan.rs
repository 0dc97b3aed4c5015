// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Streaming newline scan used by full rebuilds and incremental updates.

use std::io::{self, BufRead};

use crate::checkpoint::CheckpointTable;

/// Where a scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScanSummary {
    /// Line count including every line before the scan's starting line.
    pub total_lines: u64,
    /// Offset one past the last byte consumed.
    pub end_offset: u64,
}

/// Scans `reader` to EOF, which must be positioned at the start of line
/// `start_line` (byte `start_offset`), recording checkpoints into `table`.
///
/// Lines are never buffered whole; only newline positions are examined. A
/// trailing segment without a newline counts as a line and is always
/// recorded as the table's last checkpoint.
pub(crate) fn scan<R: BufRead>(
    reader: &mut R,
    start_line: u64,
    start_offset: u64,
    interval: u64,
    table: &mut CheckpointTable,
) -> io::Result<ScanSummary> {
    let mut line = start_line;
    let mut pos = start_offset;
    let mut in_line = false;
    let mut last_start = start_offset;

    loop {
        let buf = reader.fill_buf()?;
        let len = buf.len();
        if len == 0 {
            break;
        }
        let mut i = 0;
        while i < len {
            if !in_line {
                last_start = pos + i as u64;
                if line % interval == 0 {
                    table.push(line, last_start);
                }
                in_line = true;
            }
            match buf[i..].iter().position(|&b| b == b'\n') {
                Some(j) => {
                    i += j + 1;
                    in_line = false;
                    line += 1;
                }
                None => i = len,
            }
        }
        pos += len as u64;
        reader.consume(len);
    }

    if in_line {
        line += 1;
    }
    if line > start_line {
        table.push(line - 1, last_start);
    }

    Ok(ScanSummary {
        total_lines: line,
        end_offset: pos,
    })
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;

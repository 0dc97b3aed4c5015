// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{self, Write};
use std::path::Path;

use jlx_core::{json, DecodePolicy, JsonlIndex};
use serde_json::Value;

use crate::error::{Error, Result};

use super::Context;

pub fn run(ctx: &Context, file: &Path, lines: &[u64], pretty: bool) -> Result<()> {
    let index = ctx.open_index(file)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stderr = io::stderr();
    let mut err = stderr.lock();
    run_impl(&index, lines, pretty, &mut out, &mut err)
}

/// Prints each requested record. A line that cannot be read is reported on
/// `err` and the remaining lines are still printed.
pub(crate) fn run_impl(
    index: &JsonlIndex,
    lines: &[u64],
    pretty: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    let mut session = index.session()?;
    let mut failed = 0;
    for &line in lines {
        match session.read_parsed(line, json::<Value>, DecodePolicy::Raise) {
            Ok(Some(record)) => {
                if let Some(value) = record.parsed() {
                    write_record(out, &value, pretty)?;
                }
            }
            Ok(None) => {}
            Err(e) => {
                writeln!(err, "error: {e}")?;
                failed += 1;
            }
        }
    }
    if failed > 0 {
        return Err(Error::LinesFailed {
            failed,
            requested: lines.len(),
        });
    }
    Ok(())
}

pub(crate) fn write_record(out: &mut impl Write, value: &Value, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
#[path = "read_tests.rs"]
mod tests;

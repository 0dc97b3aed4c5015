// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{self, Write};
use std::path::Path;

use jlx_core::{json, DecodePolicy, JsonlIndex};
use serde_json::Value;

use crate::error::Result;

use super::read::write_record;
use super::Context;

pub fn run(ctx: &Context, file: &Path, n: u64, seed: Option<u64>, pretty: bool) -> Result<()> {
    let index = ctx.open_index(file)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_impl(&index, n, seed, pretty, &mut out)
}

/// Prints `n` sampled records, one per line, or as a single array when
/// `pretty`. An empty file prints nothing (`[]` when `pretty`).
pub(crate) fn run_impl(
    index: &JsonlIndex,
    n: u64,
    seed: Option<u64>,
    pretty: bool,
    out: &mut impl Write,
) -> Result<()> {
    let records: Vec<Value> = if index.total_lines() == 0 {
        Vec::new()
    } else {
        index
            .sample_parsed(n, seed, json::<Value>, DecodePolicy::Raise)?
            .into_iter()
            .flatten()
            .filter_map(|record| record.parsed())
            .collect()
    };

    if pretty {
        write_record(out, &Value::Array(records), true)?;
    } else {
        for record in &records {
            write_record(out, record, false)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "sample_tests.rs"]
mod tests;

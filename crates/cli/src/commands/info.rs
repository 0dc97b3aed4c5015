// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{self, Write};
use std::path::Path;

use chrono::SecondsFormat;
use jlx_core::IndexInfo;

use crate::error::Result;
use crate::format::{grouped, human_size};
use crate::style;

use super::Context;

pub fn run(ctx: &Context, file: &Path, json: bool) -> Result<()> {
    let index = ctx.open_index(file)?;
    let info = index.info();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        write_json(&mut out, &info)
    } else {
        write_text(&mut out, &info)
    }
}

pub(crate) fn write_json(out: &mut impl Write, info: &IndexInfo) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, info)?;
    writeln!(out)?;
    Ok(())
}

pub(crate) fn write_text(out: &mut impl Write, info: &IndexInfo) -> Result<()> {
    writeln!(out, "{} {}", style::label("File:"), info.source_path.display())?;
    writeln!(out, "{} {}", style::label("Lines:"), grouped(info.total_lines))?;
    writeln!(out, "{} {}", style::label("Size:"), human_size(info.source_size))?;
    writeln!(out, "{} {}", style::label("Index:"), info.index_path.display())?;
    writeln!(
        out,
        "{} {} every {} lines",
        style::label("Checkpoints:"),
        grouped(info.checkpoints as u64),
        grouped(info.checkpoint_interval)
    )?;
    writeln!(
        out,
        "{} {}",
        style::label("Indexed:"),
        info.indexed_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "info_tests.rs"]
mod tests;

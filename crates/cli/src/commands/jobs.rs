// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{self, Write};
use std::path::Path;

use jlx_core::{JobInfo, JobStatus, JsonlIndex, ProgressStore};

use crate::error::{Error, Result};
use crate::format::grouped;
use crate::style;

use super::Context;

fn store_for(index: &JsonlIndex, dir: Option<&Path>) -> ProgressStore {
    match dir {
        Some(dir) => ProgressStore::new(dir),
        None => ProgressStore::for_source(index.source_path()),
    }
}

pub fn list(
    ctx: &Context,
    file: &Path,
    progress_dir: Option<&Path>,
    json: bool,
    prune: bool,
) -> Result<()> {
    let index = ctx.open_index(file)?;
    let store = store_for(&index, progress_dir);
    if prune {
        let removed = store.delete_completed()?;
        tracing::info!(removed, "pruned completed jobs");
    }
    let jobs = index.list_jobs(&store)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &jobs)?;
        writeln!(out)?;
        Ok(())
    } else {
        write_text(&mut out, &jobs)
    }
}

pub(crate) fn write_text(out: &mut impl Write, jobs: &[JobInfo]) -> Result<()> {
    if jobs.is_empty() {
        writeln!(out, "No jobs recorded")?;
        return Ok(());
    }
    let width = jobs.iter().map(|j| j.job_id.len()).max().unwrap_or(0);
    for job in jobs {
        let status = match job.status {
            JobStatus::InProgress => "in progress",
            JobStatus::Completed => "completed",
        };
        write!(
            out,
            "{:<width$}  {:<11}  {}/{} ({:.1}%)",
            job.job_id,
            status,
            grouped(job.next_line),
            grouped(job.total_lines),
            job.progress_pct,
        )?;
        if job.is_stale {
            write!(out, "  {}", style::context("(stale: file changed)"))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn reset(ctx: &Context, file: &Path, progress_dir: Option<&Path>, job_id: &str) -> Result<()> {
    let index = ctx.open_index(file)?;
    let store = store_for(&index, progress_dir);
    if !store.delete(job_id)? {
        return Err(Error::JobNotFound(job_id.to_string()));
    }
    println!("Reset job '{job_id}'");
    Ok(())
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;

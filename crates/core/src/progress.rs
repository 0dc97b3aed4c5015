// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable per-job progress records.
//!
//! Each job is one JSON file, `<dir>/<job_id>.json`, kept separate from the
//! index sidecar. Records are replaced atomically, so a crash leaves either
//! the previous or the new record on disk, never a torn one.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::{read_json, write_json_atomic};
use crate::error::{Error, Result};
use crate::line::FileIdentity;

/// Progress record format version.
pub const PROGRESS_FORMAT_VERSION: u32 = 1;

const RECORD_EXTENSION: &str = "json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    InProgress,
    Completed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
        }
    }
}

/// Persisted cursor for one batch job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    pub format_version: u32,
    pub job_id: String,
    pub source_size: u64,
    pub source_mtime_ns: u64,
    /// Next line to hand to the handler.
    pub next_line: u64,
    pub total_processed: u64,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobProgress {
    pub fn new(job_id: impl Into<String>, source: FileIdentity, now: DateTime<Utc>) -> Self {
        JobProgress {
            format_version: PROGRESS_FORMAT_VERSION,
            job_id: job_id.into(),
            source_size: source.size,
            source_mtime_ns: source.mtime_ns,
            next_line: 0,
            total_processed: 0,
            status: JobStatus::InProgress,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn source(&self) -> FileIdentity {
        FileIdentity::new(self.source_size, self.source_mtime_ns)
    }
}

/// Read-only view of a job against the current state of its file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobInfo {
    pub job_id: String,
    pub next_line: u64,
    pub total_processed: u64,
    pub status: JobStatus,
    pub total_lines: u64,
    pub progress_pct: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// The file no longer matches the identity the job was recorded against.
    pub is_stale: bool,
}

impl JobInfo {
    pub fn new(job: &JobProgress, live: &FileIdentity, total_lines: u64) -> Self {
        let progress_pct = if total_lines == 0 {
            100.0
        } else {
            job.next_line as f64 / total_lines as f64 * 100.0
        };
        JobInfo {
            job_id: job.job_id.clone(),
            next_line: job.next_line,
            total_processed: job.total_processed,
            status: job.status,
            total_lines,
            progress_pct,
            created_at: job.created_at,
            updated_at: job.updated_at,
            completed_at: job.completed_at,
            is_stale: job.source() != *live,
        }
    }
}

/// Directory of job progress records keyed by job id.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    dir: PathBuf,
}

impl ProgressStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ProgressStore { dir: dir.into() }
    }

    /// Default store for `source`: the directory `<source>.progress/`.
    pub fn for_source(source: &Path) -> Self {
        let mut name = source.as_os_str().to_owned();
        name.push(".progress");
        ProgressStore::new(PathBuf::from(name))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, job_id: &str) -> Result<PathBuf> {
        validate_job_id(job_id)?;
        Ok(self.dir.join(format!("{job_id}.{RECORD_EXTENSION}")))
    }

    /// Loads a job's record. A malformed or version-incompatible record is
    /// [`Error::InvalidCheckpoint`], never treated as absent.
    pub fn load(&self, job_id: &str) -> Result<Option<JobProgress>> {
        let path = self.record_path(job_id)?;
        let job: JobProgress = match read_json(&path) {
            Ok(job) => job,
            Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        if job.format_version != PROGRESS_FORMAT_VERSION {
            return Err(Error::InvalidCheckpoint(format!(
                "unsupported progress format version {} for job '{job_id}'",
                job.format_version
            )));
        }
        if job.job_id != job_id {
            return Err(Error::InvalidCheckpoint(format!(
                "progress record at {} belongs to job '{}'",
                path.display(),
                job.job_id
            )));
        }
        if job.total_processed > job.next_line {
            return Err(Error::InvalidCheckpoint(format!(
                "job '{job_id}' processed {} lines but its cursor is at {}",
                job.total_processed, job.next_line
            )));
        }
        Ok(Some(job))
    }

    pub fn save(&self, job: &JobProgress) -> Result<()> {
        let path = self.record_path(&job.job_id)?;
        fs::create_dir_all(&self.dir)?;
        write_json_atomic(&path, job)?;
        tracing::debug!(job_id = %job.job_id, next_line = job.next_line, "saved progress");
        Ok(())
    }

    /// Removes a job's record. Returns false if there was none.
    pub fn delete(&self, job_id: &str) -> Result<bool> {
        let path = self.record_path(job_id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Every job in the store, sorted by id.
    pub fn list(&self) -> Result<Vec<JobProgress>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut jobs = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(job_id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_job_id(job_id).is_err() {
                continue;
            }
            if let Some(job) = self.load(job_id)? {
                jobs.push(job);
            }
        }
        jobs.sort_by(|a, b| a.job_id.cmp(&b.job_id));
        Ok(jobs)
    }

    /// Deletes every completed job, returning how many were removed.
    pub fn delete_completed(&self) -> Result<usize> {
        let mut removed = 0;
        for job in self.list()? {
            if job.status == JobStatus::Completed && self.delete(&job.job_id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Job ids become file names, so they are limited to a portable set.
pub fn validate_job_id(job_id: &str) -> Result<()> {
    let valid = !job_id.is_empty()
        && !job_id.starts_with('.')
        && job_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidJobId(job_id.to_string()))
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;

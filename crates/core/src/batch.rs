// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Resumable line-by-line batch processing.
//!
//! A [`BatchProcessor`] drives a handler over an index's lines and keeps a
//! durable cursor in a [`ProgressStore`]. If the process dies, the next
//! [`start_or_resume`](BatchProcessor::start_or_resume) continues from the
//! last *persisted* cursor.
//!
//! # Delivery contract
//!
//! The cursor is persisted at the cadence set by [`CheckpointPolicy`], not
//! after every line. Lines handled after the last persisted checkpoint and
//! before a crash are handed to the handler again on resume, so handlers
//! must tolerate at-least-once delivery for that window. A line whose
//! handler fails is never skipped: the cursor is persisted pointing at it.
//!
//! States: `NotStarted -> Running -> {Completed | Paused | Failed}`.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::clock::{ClockSource, SystemClock};
use crate::decode::{decode_line, DecodePolicy, Decoded};
use crate::error::{BoxError, Error, Result};
use crate::index::{file_identity, JsonlIndex};
use crate::iter::Lines;
use crate::line::RawLine;
use crate::progress::{validate_job_id, JobInfo, JobProgress, JobStatus, ProgressStore};

/// When the cursor is persisted: after `every_lines` handled lines or after
/// `every` has elapsed since the last save, whichever comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointPolicy {
    pub every_lines: u64,
    pub every: Option<Duration>,
}

impl Default for CheckpointPolicy {
    fn default() -> Self {
        CheckpointPolicy {
            every_lines: 100,
            every: Some(Duration::from_secs(5)),
        }
    }
}

impl CheckpointPolicy {
    /// Persist after every line.
    pub fn every_line() -> Self {
        CheckpointPolicy {
            every_lines: 1,
            every: None,
        }
    }
}

/// What happens to a job's record once every line has been handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionMode {
    /// Keep the record with status `completed`.
    #[default]
    MarkComplete,
    /// Delete the record.
    Remove,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Directory holding progress records. Defaults to `<source>.progress/`.
    pub progress_dir: Option<PathBuf>,
    pub checkpoint_policy: CheckpointPolicy,
    pub on_complete: CompletionMode,
}

impl BatchOptions {
    pub fn progress_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.progress_dir = Some(dir.into());
        self
    }

    pub fn checkpoint_policy(mut self, policy: CheckpointPolicy) -> Self {
        self.checkpoint_policy = policy;
        self
    }

    pub fn on_complete(mut self, mode: CompletionMode) -> Self {
        self.on_complete = mode;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    NotStarted,
    Running,
    Paused,
    Completed,
    Failed,
}

impl BatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchState::NotStarted => "not started",
            BatchState::Running => "running",
            BatchState::Paused => "paused",
            BatchState::Completed => "completed",
            BatchState::Failed => "failed",
        }
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`BatchProcessor::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Lines handed to the handler during this run.
    pub processed: u64,
    pub next_line: u64,
    pub total_lines: u64,
    pub state: BatchState,
}

pub struct BatchProcessor<'a, C: ClockSource = SystemClock> {
    index: &'a JsonlIndex,
    job_id: String,
    store: ProgressStore,
    options: BatchOptions,
    clock: C,
    job: Option<JobProgress>,
    state: BatchState,
    lines: Option<Lines<'a>>,
    unsaved: u64,
    last_saved_ms: u64,
}

impl<'a> BatchProcessor<'a, SystemClock> {
    pub fn new(index: &'a JsonlIndex, job_id: &str, options: BatchOptions) -> Result<Self> {
        Self::with_clock(index, job_id, options, SystemClock)
    }
}

impl<'a, C: ClockSource> BatchProcessor<'a, C> {
    pub fn with_clock(
        index: &'a JsonlIndex,
        job_id: &str,
        options: BatchOptions,
        clock: C,
    ) -> Result<Self> {
        validate_job_id(job_id)?;
        let store = match &options.progress_dir {
            Some(dir) => ProgressStore::new(dir),
            None => ProgressStore::for_source(index.source_path()),
        };
        Ok(BatchProcessor {
            index,
            job_id: job_id.to_string(),
            store,
            options,
            clock,
            job: None,
            state: BatchState::NotStarted,
            lines: None,
            unsaved: 0,
            last_saved_ms: 0,
        })
    }

    /// Loads the job's progress, or creates it at line 0.
    ///
    /// Fails with [`Error::StaleCheckpoint`] if the record was made against a
    /// different version of the file, and with [`Error::InvalidCheckpoint`]
    /// if its cursor lies past the end of the index. Neither is resolved
    /// automatically; [`reset`](Self::reset) discards the record.
    pub fn start_or_resume(&mut self) -> Result<BatchState> {
        if !matches!(self.state, BatchState::NotStarted | BatchState::Paused) {
            return Err(self.wrong_state("not started or paused"));
        }
        let identity = self.index.identity();
        let total_lines = self.index.total_lines();

        let job = match self.store.load(&self.job_id)? {
            Some(job) => {
                if job.source() != identity {
                    return Err(Error::StaleCheckpoint {
                        job_id: self.job_id.clone(),
                        expected: job.source(),
                        actual: identity,
                    });
                }
                if job.next_line > total_lines {
                    return Err(Error::InvalidCheckpoint(format!(
                        "job '{}' cursor {} exceeds {} lines",
                        self.job_id, job.next_line, total_lines
                    )));
                }
                tracing::info!(job_id = %self.job_id, next_line = job.next_line, "resuming job");
                job
            }
            None => {
                let job = JobProgress::new(&self.job_id, identity, self.clock.now_utc());
                self.store.save(&job)?;
                tracing::info!(job_id = %self.job_id, "starting job");
                job
            }
        };

        self.state = match job.status {
            JobStatus::Completed => BatchState::Completed,
            JobStatus::InProgress => BatchState::Running,
        };
        self.job = Some(job);
        self.lines = None;
        self.unsaved = 0;
        self.last_saved_ms = self.clock.now_ms();
        Ok(self.state)
    }

    /// Hands the next line to `handler`. Returns the line handled, or `None`
    /// once the job is complete.
    pub fn process_next<H, E>(&mut self, handler: H) -> Result<Option<u64>>
    where
        H: FnOnce(&RawLine) -> std::result::Result<(), E>,
        E: Into<BoxError>,
    {
        self.step(|raw| {
            handler(&raw)
                .map(|()| true)
                .map_err(|e| Error::Handler {
                    line: raw.line_number(),
                    source: e.into(),
                })
        })
    }

    /// Like [`process_next`](Self::process_next), parsing the line first.
    /// Under [`DecodePolicy::Skip`] an undecodable line advances the cursor
    /// without reaching the handler; under [`DecodePolicy::Raise`] it fails
    /// the job at that line.
    pub fn process_next_parsed<T, PE, P, H, E>(
        &mut self,
        parse: &P,
        policy: DecodePolicy,
        handler: H,
    ) -> Result<Option<u64>>
    where
        P: Fn(&[u8]) -> std::result::Result<T, PE>,
        PE: Into<BoxError>,
        H: FnOnce(u64, Decoded<T>) -> std::result::Result<(), E>,
        E: Into<BoxError>,
    {
        self.step(|raw| {
            let line = raw.line_number();
            match decode_line(raw, parse, policy)? {
                Some(value) => handler(line, value)
                    .map(|()| true)
                    .map_err(|e| Error::Handler {
                        line,
                        source: e.into(),
                    }),
                None => Ok(false),
            }
        })
    }

    /// Processes every remaining line.
    pub fn run<H, E>(&mut self, mut handler: H) -> Result<BatchSummary>
    where
        H: FnMut(&RawLine) -> std::result::Result<(), E>,
        E: Into<BoxError>,
    {
        let mut processed = 0;
        while self.process_next(&mut handler)?.is_some() {
            processed += 1;
        }
        Ok(self.summary(processed))
    }

    /// Processes every remaining line through `parse`.
    pub fn run_parsed<T, PE, P, H, E>(
        &mut self,
        parse: P,
        policy: DecodePolicy,
        mut handler: H,
    ) -> Result<BatchSummary>
    where
        P: Fn(&[u8]) -> std::result::Result<T, PE>,
        PE: Into<BoxError>,
        H: FnMut(u64, Decoded<T>) -> std::result::Result<(), E>,
        E: Into<BoxError>,
    {
        let mut processed = 0;
        while self
            .process_next_parsed(&parse, policy, &mut handler)?
            .is_some()
        {
            processed += 1;
        }
        Ok(self.summary(processed))
    }

    /// Persists the cursor now.
    pub fn checkpoint(&mut self) -> Result<()> {
        if !matches!(self.state, BatchState::Running | BatchState::Paused) {
            return Err(self.wrong_state("running or paused"));
        }
        self.persist()
    }

    /// Persists the cursor and releases the file handle. Resume later with
    /// [`start_or_resume`](Self::start_or_resume).
    pub fn pause(&mut self) -> Result<()> {
        if self.state != BatchState::Running {
            return Err(self.wrong_state("running"));
        }
        self.persist()?;
        self.lines = None;
        self.state = BatchState::Paused;
        Ok(())
    }

    /// Discards the job's record; the next start begins at line 0.
    pub fn reset(&mut self) -> Result<bool> {
        let existed = self.store.delete(&self.job_id)?;
        self.job = None;
        self.lines = None;
        self.state = BatchState::NotStarted;
        Ok(existed)
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn job(&self) -> Option<&JobProgress> {
        self.job.as_ref()
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    /// Next line to be handled.
    pub fn position(&self) -> u64 {
        self.job.as_ref().map_or(0, |job| job.next_line)
    }

    pub fn total_lines(&self) -> u64 {
        self.index.total_lines()
    }

    pub fn progress_pct(&self) -> f64 {
        let total = self.total_lines();
        if total == 0 {
            return 100.0;
        }
        self.position() as f64 / total as f64 * 100.0
    }

    /// Shared loop body. `f` returns whether the handler saw the line
    /// (false when the decode policy skipped it).
    fn step<F>(&mut self, f: F) -> Result<Option<u64>>
    where
        F: FnOnce(RawLine) -> Result<bool>,
    {
        match self.state {
            BatchState::Running => {}
            BatchState::Completed => return Ok(None),
            _ => return Err(self.wrong_state("running")),
        }
        let next_line = self.position();
        if next_line >= self.index.total_lines() {
            self.finish()?;
            return Ok(None);
        }

        let lines = match &mut self.lines {
            Some(lines) => lines,
            slot => slot.insert(self.index.iterate_from(next_line, None)?),
        };
        let raw = match lines.next() {
            Some(Ok(raw)) => raw,
            Some(Err(err)) => return Err(self.fail(err)),
            None => {
                self.finish()?;
                return Ok(None);
            }
        };
        let line = raw.line_number();

        let handled = match f(raw) {
            Ok(handled) => handled,
            Err(err) => return Err(self.fail(err)),
        };

        if let Some(job) = self.job.as_mut() {
            job.next_line = line + 1;
            if handled {
                job.total_processed += 1;
            }
        }
        self.unsaved += 1;
        if self.checkpoint_due() {
            self.persist()?;
        }
        Ok(Some(line))
    }

    fn checkpoint_due(&self) -> bool {
        let policy = self.options.checkpoint_policy;
        if self.unsaved >= policy.every_lines.max(1) {
            return true;
        }
        match policy.every {
            Some(every) => {
                let elapsed = self.clock.now_ms().saturating_sub(self.last_saved_ms);
                u128::from(elapsed) >= every.as_millis()
            }
            None => false,
        }
    }

    fn persist(&mut self) -> Result<()> {
        let now = self.clock.now_utc();
        let Some(job) = self.job.as_mut() else {
            return Err(Error::InvalidState {
                expected: "started",
                actual: self.state.as_str(),
            });
        };
        job.updated_at = now;
        self.store.save(job)?;
        self.unsaved = 0;
        self.last_saved_ms = self.clock.now_ms();
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.lines = None;
        let now = self.clock.now_utc();
        let Some(job) = self.job.as_mut() else {
            return Err(self.wrong_state("started"));
        };
        job.status = JobStatus::Completed;
        job.completed_at = Some(now);
        job.updated_at = now;
        match self.options.on_complete {
            CompletionMode::MarkComplete => self.store.save(job)?,
            CompletionMode::Remove => {
                self.store.delete(&self.job_id)?;
            }
        }
        self.unsaved = 0;
        self.state = BatchState::Completed;
        tracing::info!(job_id = %self.job_id, processed = job.total_processed, "job completed");
        Ok(())
    }

    /// Persists the cursor (still pointing at the failed line), marks the
    /// job failed, and hands back `err` for the caller.
    fn fail(&mut self, err: Error) -> Error {
        tracing::warn!(job_id = %self.job_id, line = self.position(), error = %err, "job failed");
        if let Err(save_err) = self.persist() {
            tracing::warn!(job_id = %self.job_id, error = %save_err, "could not save progress");
        }
        self.lines = None;
        self.state = BatchState::Failed;
        err
    }

    fn summary(&self, processed: u64) -> BatchSummary {
        BatchSummary {
            processed,
            next_line: self.position(),
            total_lines: self.total_lines(),
            state: self.state,
        }
    }

    fn wrong_state(&self, expected: &'static str) -> Error {
        Error::InvalidState {
            expected,
            actual: self.state.as_str(),
        }
    }
}

impl JsonlIndex {
    /// Creates a batch processor for `job_id` over this index.
    pub fn batch_processor(&self, job_id: &str, options: BatchOptions) -> Result<BatchProcessor<'_>> {
        BatchProcessor::new(self, job_id, options)
    }

    /// Every job recorded in `store`, viewed against the live file.
    pub fn list_jobs(&self, store: &ProgressStore) -> Result<Vec<JobInfo>> {
        let live = file_identity(self.source_path())?;
        Ok(store
            .list()?
            .iter()
            .map(|job| JobInfo::new(job, &live, self.total_lines()))
            .collect())
    }

    pub fn get_job(&self, store: &ProgressStore, job_id: &str) -> Result<Option<JobInfo>> {
        let live = file_identity(self.source_path())?;
        Ok(store
            .load(job_id)?
            .map(|job| JobInfo::new(&job, &live, self.total_lines())))
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::decode::json;
use crate::index::IndexOptions;
use crate::test_support::{append_records, temp_jsonl};
use chrono::Utc;
use serde_json::Value;
use std::fs;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use tempfile::TempDir;

/// Mock clock for testing with controllable time.
struct MockClock {
    time_ms: AtomicU64,
}

impl MockClock {
    fn new(initial_ms: u64) -> Self {
        MockClock {
            time_ms: AtomicU64::new(initial_ms),
        }
    }

    fn advance(&self, ms: u64) {
        self.time_ms.fetch_add(ms, AtomicOrdering::SeqCst);
    }
}

impl ClockSource for MockClock {
    fn now_ms(&self) -> u64 {
        self.time_ms.load(AtomicOrdering::SeqCst)
    }
}

fn open(path: &std::path::Path) -> JsonlIndex {
    JsonlIndex::open(path, IndexOptions::default().checkpoint_interval(4)).unwrap()
}

fn every(lines: u64) -> BatchOptions {
    BatchOptions::default().checkpoint_policy(CheckpointPolicy {
        every_lines: lines,
        every: None,
    })
}

fn ok(_line: &RawLine) -> std::io::Result<()> {
    Ok(())
}

fn saved_cursor(index: &JsonlIndex, job_id: &str) -> u64 {
    ProgressStore::for_source(index.source_path())
        .load(job_id)
        .unwrap()
        .unwrap()
        .next_line
}

#[test]
fn run_processes_every_line_in_order() {
    let (_dir, path) = temp_jsonl(10);
    let index = open(&path);
    let mut batch = index.batch_processor("export", BatchOptions::default()).unwrap();
    assert_eq!(batch.start_or_resume().unwrap(), BatchState::Running);

    let mut seen = Vec::new();
    let summary = batch
        .run(|line: &RawLine| -> std::io::Result<()> {
            seen.push(line.line_number());
            Ok(())
        })
        .unwrap();

    assert_eq!(seen, (0..10).collect::<Vec<_>>());
    assert_eq!(
        summary,
        BatchSummary {
            processed: 10,
            next_line: 10,
            total_lines: 10,
            state: BatchState::Completed,
        }
    );
    let job = batch.store().load("export").unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.total_processed, 10);
    assert!(job.completed_at.is_some());
    assert_eq!(batch.progress_pct(), 100.0);
}

#[test]
fn new_job_is_persisted_immediately() {
    let (_dir, path) = temp_jsonl(5);
    let index = open(&path);
    let mut batch = index.batch_processor("fresh", BatchOptions::default()).unwrap();
    batch.start_or_resume().unwrap();
    assert_eq!(saved_cursor(&index, "fresh"), 0);
}

#[test]
fn crash_resumes_from_last_persisted_cursor() {
    let (_dir, path) = temp_jsonl(10);
    let index = open(&path);

    {
        let mut batch = index.batch_processor("job", every(3)).unwrap();
        batch.start_or_resume().unwrap();
        for _ in 0..7 {
            batch.process_next(ok).unwrap();
        }
        assert_eq!(batch.position(), 7);
        // dropped without pause or checkpoint
    }
    assert_eq!(saved_cursor(&index, "job"), 6);

    let mut batch = index.batch_processor("job", every(3)).unwrap();
    batch.start_or_resume().unwrap();
    assert_eq!(batch.position(), 6);

    let mut seen = Vec::new();
    batch
        .run(|line: &RawLine| -> std::io::Result<()> {
            seen.push(line.line_number());
            Ok(())
        })
        .unwrap();
    // line 6 is delivered again
    assert_eq!(seen, vec![6, 7, 8, 9]);
}

#[test]
fn pause_persists_and_resume_continues() {
    let (_dir, path) = temp_jsonl(10);
    let index = open(&path);
    let mut batch = index.batch_processor("job", BatchOptions::default()).unwrap();
    batch.start_or_resume().unwrap();
    for _ in 0..4 {
        batch.process_next(ok).unwrap();
    }

    batch.pause().unwrap();
    assert_eq!(batch.state(), BatchState::Paused);
    assert_eq!(saved_cursor(&index, "job"), 4);
    assert!(matches!(
        batch.process_next(ok),
        Err(Error::InvalidState { .. })
    ));

    assert_eq!(batch.start_or_resume().unwrap(), BatchState::Running);
    assert_eq!(batch.process_next(ok).unwrap(), Some(4));
}

#[test]
fn explicit_checkpoint_persists_cursor() {
    let (_dir, path) = temp_jsonl(10);
    let index = open(&path);
    let mut batch = index.batch_processor("job", every(100)).unwrap();
    batch.start_or_resume().unwrap();
    batch.process_next(ok).unwrap();
    batch.process_next(ok).unwrap();
    assert_eq!(saved_cursor(&index, "job"), 0);

    batch.checkpoint().unwrap();
    assert_eq!(saved_cursor(&index, "job"), 2);
}

#[test]
fn elapsed_time_triggers_checkpoint() {
    let (_dir, path) = temp_jsonl(10);
    let index = open(&path);
    let clock = MockClock::new(1_700_000_000_000);
    let options = BatchOptions::default().checkpoint_policy(CheckpointPolicy {
        every_lines: 1000,
        every: Some(Duration::from_secs(5)),
    });
    let mut batch = BatchProcessor::with_clock(&index, "timed", options, &clock).unwrap();
    batch.start_or_resume().unwrap();

    batch.process_next(ok).unwrap();
    assert_eq!(saved_cursor(&index, "timed"), 0);

    clock.advance(6_000);
    batch.process_next(ok).unwrap();
    let job = batch.store().load("timed").unwrap().unwrap();
    assert_eq!(job.next_line, 2);
    assert_eq!(job.updated_at.timestamp_millis(), 1_700_000_006_000);
    assert_eq!(job.created_at.timestamp_millis(), 1_700_000_000_000);
}

#[test]
fn handler_failure_keeps_failed_line() {
    let (_dir, path) = temp_jsonl(10);
    let index = open(&path);
    let mut batch = index.batch_processor("job", every(100)).unwrap();
    batch.start_or_resume().unwrap();

    let err = batch
        .run(|line: &RawLine| -> std::io::Result<()> {
            if line.line_number() == 5 {
                Err(std::io::Error::other("downstream unavailable"))
            } else {
                Ok(())
            }
        })
        .unwrap_err();

    assert!(matches!(err, Error::Handler { line: 5, .. }));
    assert_eq!(batch.state(), BatchState::Failed);
    assert_eq!(saved_cursor(&index, "job"), 5);

    let mut retry = index.batch_processor("job", every(100)).unwrap();
    retry.start_or_resume().unwrap();
    assert_eq!(retry.process_next(ok).unwrap(), Some(5));
}

#[test]
fn stale_job_requires_reset() {
    let (_dir, path) = temp_jsonl(10);
    let mut index = open(&path);
    {
        let mut batch = index.batch_processor("job", every(1)).unwrap();
        batch.start_or_resume().unwrap();
        batch.process_next(ok).unwrap();
    }
    append_records(&path, 10, 12);
    index.update().unwrap();

    let mut batch = index.batch_processor("job", every(1)).unwrap();
    let err = batch.start_or_resume().unwrap_err();
    assert!(matches!(err, Error::StaleCheckpoint { ref job_id, .. } if job_id == "job"));

    assert!(batch.reset().unwrap());
    batch.start_or_resume().unwrap();
    assert_eq!(batch.position(), 0);
    assert_eq!(batch.total_lines(), 12);
}

#[test]
fn cursor_past_end_is_invalid() {
    let (_dir, path) = temp_jsonl(10);
    let index = open(&path);
    let store = ProgressStore::for_source(index.source_path());
    let mut job = JobProgress::new("job", index.identity(), Utc::now());
    job.next_line = 50;
    store.save(&job).unwrap();

    let mut batch = index.batch_processor("job", BatchOptions::default()).unwrap();
    assert!(matches!(
        batch.start_or_resume(),
        Err(Error::InvalidCheckpoint(_))
    ));
}

#[test]
fn completed_job_stays_completed() {
    let (_dir, path) = temp_jsonl(3);
    let index = open(&path);
    let mut batch = index.batch_processor("job", BatchOptions::default()).unwrap();
    batch.start_or_resume().unwrap();
    batch.run(ok).unwrap();

    let mut again = index.batch_processor("job", BatchOptions::default()).unwrap();
    assert_eq!(again.start_or_resume().unwrap(), BatchState::Completed);
    assert_eq!(again.process_next(ok).unwrap(), None);
}

#[test]
fn remove_on_complete_deletes_record() {
    let (_dir, path) = temp_jsonl(3);
    let index = open(&path);
    let options = BatchOptions::default().on_complete(CompletionMode::Remove);
    let mut batch = index.batch_processor("job", options).unwrap();
    batch.start_or_resume().unwrap();
    let summary = batch.run(ok).unwrap();

    assert_eq!(summary.state, BatchState::Completed);
    assert_eq!(batch.store().load("job").unwrap(), None);
}

#[test]
fn empty_file_completes_immediately() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.jsonl");
    fs::write(&path, b"").unwrap();
    let index = open(&path);

    let mut batch = index.batch_processor("job", BatchOptions::default()).unwrap();
    batch.start_or_resume().unwrap();
    assert_eq!(batch.process_next(ok).unwrap(), None);
    assert_eq!(batch.state(), BatchState::Completed);
}

#[test]
fn processing_before_start_is_rejected() {
    let (_dir, path) = temp_jsonl(3);
    let index = open(&path);
    let mut batch = index.batch_processor("job", BatchOptions::default()).unwrap();
    assert!(matches!(
        batch.process_next(ok),
        Err(Error::InvalidState {
            actual: "not started",
            ..
        })
    ));
    assert!(matches!(batch.pause(), Err(Error::InvalidState { .. })));
}

#[test]
fn invalid_job_id_is_rejected() {
    let (_dir, path) = temp_jsonl(3);
    let index = open(&path);
    assert!(matches!(
        index.batch_processor("../etc", BatchOptions::default()),
        Err(Error::InvalidJobId(_))
    ));
}

fn mixed_index(dir: &TempDir) -> JsonlIndex {
    let path = dir.path().join("mixed.jsonl");
    fs::write(&path, "{\"n\":0}\nnot json\n{\"n\":2}\n{broken\n{\"n\":4}\n").unwrap();
    open(&path)
}

#[test]
fn skipped_records_advance_without_counting() {
    let dir = TempDir::new().unwrap();
    let index = mixed_index(&dir);
    let mut batch = index.batch_processor("job", BatchOptions::default()).unwrap();
    batch.start_or_resume().unwrap();

    let mut seen = Vec::new();
    batch
        .run_parsed(
            json::<Value>,
            DecodePolicy::Skip,
            |line, value: Decoded<Value>| -> std::io::Result<()> {
                seen.push((line, value.parsed().unwrap()["n"].as_u64().unwrap()));
                Ok(())
            },
        )
        .unwrap();

    assert_eq!(seen, vec![(0, 0), (2, 2), (4, 4)]);
    let job = batch.job().unwrap();
    assert_eq!(job.next_line, 5);
    assert_eq!(job.total_processed, 3);
}

#[test]
fn undecodable_record_fails_under_raise() {
    let dir = TempDir::new().unwrap();
    let index = mixed_index(&dir);
    let mut batch = index.batch_processor("job", BatchOptions::default()).unwrap();
    batch.start_or_resume().unwrap();

    let err = batch
        .run_parsed(
            json::<Value>,
            DecodePolicy::Raise,
            |_line, _value: Decoded<Value>| -> std::io::Result<()> { Ok(()) },
        )
        .unwrap_err();
    assert!(matches!(err, Error::Decode { line: 1, .. }));
    assert_eq!(batch.state(), BatchState::Failed);
    assert_eq!(saved_cursor(&index, "job"), 1);
}

#[test]
fn custom_progress_dir_and_job_listing() {
    let (dir, path) = temp_jsonl(8);
    let index = open(&path);
    let progress = dir.path().join("jobs");
    let options = every(1).progress_dir(&progress);

    let mut first = index.batch_processor("first", options.clone()).unwrap();
    first.start_or_resume().unwrap();
    for _ in 0..2 {
        first.process_next(ok).unwrap();
    }
    let mut second = index.batch_processor("second", options).unwrap();
    second.start_or_resume().unwrap();
    second.run(ok).unwrap();

    let store = ProgressStore::new(&progress);
    let jobs = index.list_jobs(&store).unwrap();
    let ids: Vec<&str> = jobs.iter().map(|j| j.job_id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second"]);
    assert_eq!(jobs[0].progress_pct, 25.0);
    assert_eq!(jobs[1].status, JobStatus::Completed);
    assert!(jobs.iter().all(|j| !j.is_stale));

    let info = index.get_job(&store, "first").unwrap().unwrap();
    assert_eq!(info.next_line, 2);
    assert!(index.get_job(&store, "third").unwrap().is_none());
}

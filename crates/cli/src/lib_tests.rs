// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::events;
use clap::Parser;
use std::fs;
use tempfile::TempDir;

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("jlx").chain(args.iter().copied())).unwrap()
}

#[test]
fn global_flags_parse_after_subcommand() {
    let parsed = cli(&["info", "events.jsonl", "--interval", "25", "--rebuild"]);
    assert_eq!(parsed.interval, Some(25));
    assert!(parsed.rebuild);
    assert!(matches!(parsed.command, Command::Info { json: false, .. }));
}

#[test]
fn zero_interval_is_rejected_by_parser() {
    assert!(Cli::try_parse_from(["jlx", "--interval", "0", "info", "f.jsonl"]).is_err());
}

#[test]
fn read_requires_a_line() {
    assert!(Cli::try_parse_from(["jlx", "read", "f.jsonl"]).is_err());
}

#[test]
fn info_writes_sidecar_with_configured_interval() {
    let (dir, path) = events(30);
    let config = dir.path().join("config.toml");
    fs::write(&config, "checkpoint_interval = 7\n").unwrap();

    run(cli(&[
        "--config",
        config.to_str().unwrap(),
        "info",
        path.to_str().unwrap(),
    ]))
    .unwrap();

    let index = jlx_core::JsonlIndex::open(&path, jlx_core::IndexOptions::default()).unwrap();
    assert_eq!(index.metadata().checkpoint_interval, 7);
}

#[test]
fn rebuild_replaces_a_corrupt_sidecar() {
    let (dir, path) = events(10);
    let config = dir.path().join("none.toml");
    fs::write(jlx_core::default_index_path(&path), "garbage").unwrap();
    let config = config.to_str().unwrap();
    let file = path.to_str().unwrap();

    let err = run(cli(&["--config", config, "info", file])).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(jlx_core::Error::InvalidCheckpoint(_))
    ));

    run(cli(&["--config", config, "--rebuild", "info", file])).unwrap();
    run(cli(&["--config", config, "info", file])).unwrap();
}

#[test]
fn reset_of_unknown_job_fails() {
    let (dir, path) = events(3);
    let config = dir.path().join("none.toml");
    let err = run(cli(&[
        "--config",
        config.to_str().unwrap(),
        "reset",
        path.to_str().unwrap(),
        "ghost",
    ]))
    .unwrap_err();
    assert!(matches!(err, Error::JobNotFound(ref id) if id == "ghost"));
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("none.toml");
    let missing = dir.path().join("missing.jsonl");
    let err = run(cli(&[
        "--config",
        config.to_str().unwrap(),
        "read",
        missing.to_str().unwrap(),
        "0",
    ]))
    .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `jlx` isolated from the user's config and log settings.
pub fn jlx(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("jlx");
    cmd.env("JLX_CONFIG", temp.path().join("config.toml"))
        .env_remove("JLX_LOG")
        .env("NO_COLOR", "1")
        .current_dir(temp.path());
    cmd
}

/// The JSON record written for line `n`.
pub fn record(n: u64) -> String {
    format!("{{\"id\":{n},\"name\":\"item-{n}\"}}")
}

/// Writes `events.jsonl` with `count` records into `temp`.
pub fn events(temp: &TempDir, count: u64) -> PathBuf {
    write_lines(temp.path(), "events.jsonl", (0..count).map(record))
}

pub fn write_lines(dir: &Path, name: &str, lines: impl Iterator<Item = String>) -> PathBuf {
    let path = dir.join(name);
    let body: String = lines.map(|line| line + "\n").collect();
    fs::write(&path, body).unwrap();
    path
}

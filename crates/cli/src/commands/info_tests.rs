// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::{context, events};

#[test]
fn text_output_lists_each_field() {
    let (_dir, path) = events(1500);
    let index = context().open_index(&path).unwrap();
    let mut out = Vec::new();
    write_text(&mut out, &index.info()).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("Lines:"));
    assert!(text.contains("1,500"));
    assert!(text.contains("KB"));
    assert!(text.contains("events.jsonl.idx"));
    assert!(text.contains("every 10 lines"));
}

#[test]
fn json_output_is_parseable() {
    let (_dir, path) = events(25);
    let index = context().open_index(&path).unwrap();
    let mut out = Vec::new();
    write_json(&mut out, &index.info()).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(value["total_lines"], 25);
    assert_eq!(value["checkpoint_interval"], 10);
    assert_eq!(value["checkpoints"], 4);
}

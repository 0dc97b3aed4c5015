// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

fn ten_line_table() -> CheckpointTable {
    // 10 lines at interval 3: checkpoints at 0, 3, 6, 9
    CheckpointTable::from_pairs(&[(0, 0), (3, 30), (6, 60), (9, 90)]).unwrap()
}

#[parameterized(
    first = { 0, 0 },
    inside_first_stride = { 2, 0 },
    exact = { 3, 3 },
    seven = { 7, 6 },
    last = { 9, 9 },
    past_last = { 15, 9 },
)]
fn floor_finds_nearest_checkpoint_at_or_before(line: u64, expected: u64) {
    let table = ten_line_table();
    assert_eq!(table.floor(line).unwrap().line, expected);
}

#[test]
fn floor_on_empty_table_is_none() {
    assert!(CheckpointTable::new().floor(0).is_none());
}

#[test]
fn get_returns_exact_offsets_only() {
    let table = ten_line_table();
    assert_eq!(table.get(6), Some(60));
    assert_eq!(table.get(7), None);
}

#[test]
fn push_ignores_repeated_line() {
    let mut table = CheckpointTable::new();
    table.push(0, 0);
    table.push(3, 30);
    table.push(3, 30);
    assert_eq!(table.len(), 2);
}

#[test]
fn truncate_from_drops_tail() {
    let mut table = ten_line_table();
    table.truncate_from(6);
    assert_eq!(table.to_pairs(), vec![(0, 0), (3, 30)]);
}

#[test]
fn from_pairs_rejects_non_increasing_lines() {
    let err = CheckpointTable::from_pairs(&[(0, 0), (5, 50), (3, 60)]).unwrap_err();
    assert!(matches!(err, Error::InvalidCheckpoint(_)));
}

#[test]
fn from_pairs_rejects_non_increasing_offsets() {
    let err = CheckpointTable::from_pairs(&[(0, 0), (3, 30), (6, 30)]).unwrap_err();
    assert!(matches!(err, Error::InvalidCheckpoint(_)));
}

#[test]
fn validate_layout_accepts_stride_plus_last() {
    ten_line_table().validate_layout(3, 10).unwrap();

    // 11 lines: stride points 0,3,6,9 plus the last line 10
    let table =
        CheckpointTable::from_pairs(&[(0, 0), (3, 30), (6, 60), (9, 90), (10, 100)]).unwrap();
    table.validate_layout(3, 11).unwrap();
}

#[parameterized(
    missing_stride = { &[(0, 0), (6, 60), (9, 90)], 3, 10 },
    missing_last = { &[(0, 0), (3, 30), (6, 60)], 3, 8 },
    extra_entry = { &[(0, 0), (2, 20), (3, 30)], 3, 4 },
    zero_interval = { &[(0, 0)], 0, 1 },
    nonzero_first_offset = { &[(0, 5)], 3, 1 },
    entries_for_empty_file = { &[(0, 0)], 3, 0 },
)]
fn validate_layout_rejects(pairs: &[(u64, u64)], interval: u64, total: u64) {
    let table = CheckpointTable::from_pairs(pairs).unwrap();
    let err = table.validate_layout(interval, total).unwrap_err();
    assert!(matches!(err, Error::InvalidCheckpoint(_)));
}

#[parameterized(
    stride_one = { 1, 1 << 40 },
    stride_three = { 3, u64::MAX },
    stride_max = { u64::MAX, u64::MAX },
)]
fn validate_layout_counts_before_walking(interval: u64, total: u64) {
    let table = CheckpointTable::from_pairs(&[(0, 0)]).unwrap();
    let err = table.validate_layout(interval, total).unwrap_err();
    assert!(matches!(err, Error::InvalidCheckpoint(_)));
}

#[test]
fn validate_layout_accepts_a_single_line() {
    let table = CheckpointTable::from_pairs(&[(0, 0)]).unwrap();
    table.validate_layout(100, 1).unwrap();
    table.validate_layout(u64::MAX, 1).unwrap();
}

#[test]
fn empty_table_is_valid_for_empty_file() {
    CheckpointTable::new().validate_layout(100, 0).unwrap();
}

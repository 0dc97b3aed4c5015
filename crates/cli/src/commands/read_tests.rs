// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::{context, events};

fn read(index: &JsonlIndex, lines: &[u64], pretty: bool) -> (Result<()>, String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let result = run_impl(index, lines, pretty, &mut out, &mut err);
    (
        result,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[test]
fn prints_records_in_requested_order() {
    let (_dir, path) = events(50);
    let index = context().open_index(&path).unwrap();
    let (result, out, err) = read(&index, &[30, 2], false);

    result.unwrap();
    assert_eq!(
        out,
        "{\"id\":30,\"name\":\"item-30\"}\n{\"id\":2,\"name\":\"item-2\"}\n"
    );
    assert!(err.is_empty());
}

#[test]
fn pretty_output_is_indented() {
    let (_dir, path) = events(5);
    let index = context().open_index(&path).unwrap();
    let (result, out, _) = read(&index, &[1], true);

    result.unwrap();
    assert!(out.contains("\n  \"id\": 1,"));
}

#[test]
fn out_of_range_lines_are_reported_and_skipped() {
    let (_dir, path) = events(5);
    let index = context().open_index(&path).unwrap();
    let (result, out, err) = read(&index, &[1, 9, 3], false);

    assert!(matches!(
        result,
        Err(Error::LinesFailed {
            failed: 1,
            requested: 3
        })
    ));
    assert_eq!(out.lines().count(), 2);
    assert!(err.contains("line 9 out of range"));
}

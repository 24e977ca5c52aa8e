// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn empty_table_renders_nothing() {
    let table = Table::plain(vec![Column::left("HOST")]);
    let mut out = Vec::new();
    table.render(&mut out);
    assert!(out.is_empty());
}

#[test]
fn columns_pad_to_widest_cell() {
    let mut table = Table::plain(vec![Column::left("HOST"), Column::right("FILES")]);
    table.row(vec!["mirror1".to_string(), "3".to_string()]);
    table.row(vec!["m".to_string(), "120".to_string()]);

    let mut out = Vec::new();
    table.render(&mut out);
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("mirror1"));
    assert!(lines[2].contains("120"));
}

#[test]
fn max_width_truncates_long_cells() {
    let mut table = Table::plain(vec![Column::left("HOST").with_max(3), Column::left("ALIAS")]);
    table.row(vec!["mirror1".to_string(), "a".to_string()]);

    let mut out = Vec::new();
    table.render(&mut out);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("mir"));
    assert!(!text.contains("mirror1"));
}

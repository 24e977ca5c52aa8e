// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

#[test]
fn file_counter_starts_at_zero_and_advances_by_count() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("counter.bin");
    let counter = FileCounter::new(&path);

    let first = counter.allocate(5).expect("allocate");
    assert_eq!(first, UniqueNumber::new(0));

    let second = counter.allocate(3).expect("allocate");
    assert_eq!(second, UniqueNumber::new(5));

    assert_eq!(peek(&path).expect("peek"), 8);
}

#[test]
fn file_counter_persists_across_reopen() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("counter.bin");

    FileCounter::new(&path).allocate(10).expect("allocate");

    let reopened = FileCounter::new(&path);
    let next = reopened.allocate(1).expect("allocate");
    assert_eq!(next, UniqueNumber::new(10));
}

#[test]
fn file_counter_wraps_around_u32_max() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("counter.bin");
    std::fs::write(&path, (u32::MAX - 2).to_le_bytes()).expect("seed");

    let counter = FileCounter::new(&path);
    let first = counter.allocate(5).expect("allocate");
    assert_eq!(first, UniqueNumber::new(u32::MAX - 2));
    assert_eq!(peek(&path).expect("peek"), 2);
}

#[test]
fn concurrent_allocations_never_overlap() {
    let dir = tempdir().expect("tempdir");
    let path = Arc::new(dir.path().join("counter.bin"));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let path = Arc::clone(&path);
            thread::spawn(move || FileCounter::new(&*path).allocate(10).expect("allocate"))
        })
        .collect();

    let mut values: Vec<u32> = handles
        .into_iter()
        .map(|h| h.join().expect("join").get())
        .collect();
    values.sort_unstable();

    for pair in values.windows(2) {
        assert!(pair[1] - pair[0] >= 10, "ranges overlapped: {values:?}");
    }
}

#[test]
fn peek_returns_zero_for_nonexistent_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("missing.bin");
    assert_eq!(peek(&path).expect("peek"), 0);
}

#[test]
fn in_memory_counter_advances_without_touching_disk() {
    let counter = InMemoryCounter::starting_at(100);
    assert_eq!(counter.allocate(1).unwrap(), UniqueNumber::new(100));
    assert_eq!(counter.allocate(4).unwrap(), UniqueNumber::new(101));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use afd_core::{DirFlags, HostId};
use afd_storage::InMemoryCounter;

fn target(dir_id: u32, source: &Path, interval_ms: u64) -> WatchTarget {
    WatchTarget {
        dir_id: DirId::new(dir_id),
        source_path: source.to_path_buf(),
        scan_interval_ms: interval_ms,
    }
}

#[test]
fn due_targets_filters_by_deadline_and_disabled_flags() {
    let source = tempfile::tempdir().unwrap();
    let watcher = DirectoryWatcher::new(vec![target(1, source.path(), 1_000)]);

    let mut due = DirectorySlot::new(DirId::new(1), "incoming");
    due.next_check_time = 50;
    let mut not_due = DirectorySlot::new(DirId::new(1), "incoming");
    not_due.next_check_time = 5_000;
    let mut disabled = DirectorySlot::new(DirId::new(1), "incoming");
    disabled.next_check_time = 0;
    disabled.flags.insert(DirFlags::DIR_DISABLED);

    assert_eq!(watcher.due_targets(std::iter::once(&due), 100).len(), 1);
    assert_eq!(watcher.due_targets(std::iter::once(&not_due), 100).len(), 0);
    assert_eq!(watcher.due_targets(std::iter::once(&disabled), 100).len(), 0);
}

#[test]
fn poll_with_no_files_only_reschedules() {
    let source = tempfile::tempdir().unwrap();
    let spool = tempfile::tempdir().unwrap();
    let watcher = DirectoryWatcher::new(vec![target(1, source.path(), 1_000)]);
    let counter = InMemoryCounter::new();
    let routes = RouteTable::new();

    let events = watcher
        .poll(
            &watcher.target(DirId::new(1)).unwrap().clone(),
            &routes,
            spool.path(),
            &counter,
            JobId::new(1),
            5,
            10_000,
        )
        .unwrap();

    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        Event::DirNextScanScheduled {
            next_check_time_ms: 11_000,
            ..
        }
    ));
}

#[test]
fn poll_with_files_stages_and_enqueues_then_reschedules() {
    let source = tempfile::tempdir().unwrap();
    std::fs::write(source.path().join("a.txt"), b"hello").unwrap();
    std::fs::write(source.path().join("b.txt"), b"world!").unwrap();

    let spool = tempfile::tempdir().unwrap();
    let watcher = DirectoryWatcher::new(vec![target(7, source.path(), 2_000)]);
    let counter = InMemoryCounter::new();
    let routes = RouteTable::new();

    let events = watcher
        .poll(
            &watcher.target(DirId::new(7)).unwrap().clone(),
            &routes,
            spool.path(),
            &counter,
            JobId::new(42),
            5,
            10_000,
        )
        .unwrap();

    assert_eq!(events.len(), 2);
    let Event::JobEnqueued {
        message,
        staging_dir,
        ..
    } = &events[0]
    else {
        panic!("expected JobEnqueued as the first event");
    };
    assert_eq!(message.files_to_send, 2);
    assert_eq!(message.file_size, 11);
    assert_eq!(message.dir_no, DirId::new(7));

    let staged_dir = spool.path().join(staging_dir);
    assert!(staged_dir.join("a.txt").exists());
    assert!(staged_dir.join("b.txt").exists());
    assert!(!source.path().join("a.txt").exists());

    assert!(matches!(
        events[1],
        Event::DirNextScanScheduled {
            next_check_time_ms: 12_000,
            ..
        }
    ));
}

#[test]
fn poll_with_files_and_a_configured_route_establishes_the_host_backlog() {
    let source = tempfile::tempdir().unwrap();
    std::fs::write(source.path().join("a.txt"), b"hello").unwrap();

    let spool = tempfile::tempdir().unwrap();
    let watcher = DirectoryWatcher::new(vec![target(7, source.path(), 2_000)]);
    let counter = InMemoryCounter::new();
    let mut routes = RouteTable::new();
    let host_id = HostId::new(3);
    routes.insert(DirId::new(7), host_id);

    let events = watcher
        .poll(
            &watcher.target(DirId::new(7)).unwrap().clone(),
            &routes,
            spool.path(),
            &counter,
            JobId::new(42),
            5,
            10_000,
        )
        .unwrap();

    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], Event::JobEnqueued { .. }));
    assert!(matches!(
        events[1],
        Event::HostCountersAdjusted {
            host_id: h,
            delta_files: 1,
            delta_bytes: 5,
        } if h == host_id
    ));
    assert!(matches!(events[2], Event::DirNextScanScheduled { .. }));
}

#[test]
fn list_new_files_ignores_subdirectories() {
    let source = tempfile::tempdir().unwrap();
    std::fs::write(source.path().join("f.txt"), b"x").unwrap();
    std::fs::create_dir(source.path().join("subdir")).unwrap();

    let files = DirectoryWatcher::list_new_files(&target(1, source.path(), 1_000)).unwrap();
    assert_eq!(files.len(), 1);
}

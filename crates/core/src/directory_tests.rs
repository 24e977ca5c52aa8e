// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn force_rescan_noop_when_already_due() {
    let mut d = DirectorySlot::new(DirId::new(1), "dir1");
    d.next_check_time = 100;
    assert_eq!(d.force_rescan(200), None);
    assert_eq!(d.next_check_time, 100);
}

#[test]
fn force_rescan_overwrites_next_check_time() {
    let mut d = DirectorySlot::new(DirId::new(1), "dir1");
    d.next_check_time = 500;
    let emit = d.force_rescan(100);
    assert_eq!(emit, Some(false));
    assert_eq!(d.next_check_time, 100);
}

#[test]
fn force_rescan_emits_message_only_for_pull_directories() {
    let mut d = DirectorySlot::new(DirId::new(1), "dir1");
    d.host_alias = Some("hostA".into());
    d.next_check_time = 500;
    assert_eq!(d.force_rescan(100), Some(true));
}

#[test]
fn schedule_next_scan_can_move_the_deadline_forward() {
    let mut d = DirectorySlot::new(DirId::new(1), "dir1");
    d.next_check_time = 100;
    d.schedule_next_scan(1_000);
    assert_eq!(d.next_check_time, 1_000);
}

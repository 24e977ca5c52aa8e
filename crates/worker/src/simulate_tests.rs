// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn send_file_reports_file_size_without_copying_anything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.bin");
    std::fs::write(&path, vec![0u8; 4096]).unwrap();

    let mut adapter = SimulateAdapter::new();
    adapter.connect("anyhost").unwrap();

    let mut last_progress = 0u64;
    let total = adapter
        .send_file(&path, "remote.bin", &mut |n| last_progress = n)
        .unwrap();

    assert_eq!(total, 4096);
    assert_eq!(last_progress, 4096);
    assert!(!dir.path().join("remote.bin").exists());
}

#[test]
fn send_file_before_connect_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.bin");
    std::fs::write(&path, b"x").unwrap();

    let mut adapter = SimulateAdapter::new();
    let err = adapter
        .send_file(&path, "remote.bin", &mut |_| {})
        .unwrap_err();
    assert!(matches!(err, ProtocolError::Protocol(_)));
}

#[test]
fn disconnect_requires_reconnect_before_further_sends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.bin");
    std::fs::write(&path, b"x").unwrap();

    let mut adapter = SimulateAdapter::new();
    adapter.connect("anyhost").unwrap();
    adapter.disconnect().unwrap();

    let err = adapter
        .send_file(&path, "remote.bin", &mut |_| {})
        .unwrap_err();
    assert!(matches!(err, ProtocolError::Protocol(_)));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;
use std::io::Write as _;

#[test]
fn send_file_copies_bytes_and_reports_progress() {
    let src_dir = tempfile::tempdir().unwrap();
    let dst_dir = tempfile::tempdir().unwrap();

    let src_path = src_dir.path().join("payload.dat");
    let mut f = fs::File::create(&src_path).unwrap();
    f.write_all(&vec![7u8; 200_000]).unwrap();
    drop(f);

    let mut adapter = LocAdapter::new();
    adapter
        .connect(dst_dir.path().to_str().unwrap())
        .unwrap();

    let mut progress_calls = Vec::new();
    let total = adapter
        .send_file(&src_path, "payload.dat", &mut |n| progress_calls.push(n))
        .unwrap();

    assert_eq!(total, 200_000);
    assert_eq!(*progress_calls.last().unwrap(), 200_000);
    assert!(progress_calls.len() > 1);

    let copied = fs::read(dst_dir.path().join("payload.dat")).unwrap();
    assert_eq!(copied.len(), 200_000);
    assert!(copied.iter().all(|&b| b == 7));
}

#[test]
fn connect_creates_missing_destination_directory() {
    let dst_root = tempfile::tempdir().unwrap();
    let nested = dst_root.path().join("a/b/c");

    let mut adapter = LocAdapter::new();
    adapter.connect(nested.to_str().unwrap()).unwrap();

    assert!(nested.is_dir());
}

#[test]
fn send_file_before_connect_is_a_protocol_error() {
    let src_dir = tempfile::tempdir().unwrap();
    let src_path = src_dir.path().join("f.txt");
    fs::write(&src_path, b"hi").unwrap();

    let mut adapter = LocAdapter::new();
    let err = adapter
        .send_file(&src_path, "f.txt", &mut |_| {})
        .unwrap_err();
    assert!(matches!(err, ProtocolError::Protocol(_)));
}

#[test]
fn disconnect_clears_destination_and_blocks_further_sends() {
    let src_dir = tempfile::tempdir().unwrap();
    let dst_dir = tempfile::tempdir().unwrap();
    let src_path = src_dir.path().join("f.txt");
    fs::write(&src_path, b"hi").unwrap();

    let mut adapter = LocAdapter::new();
    adapter.connect(dst_dir.path().to_str().unwrap()).unwrap();
    adapter.disconnect().unwrap();

    let err = adapter
        .send_file(&src_path, "f.txt", &mut |_| {})
        .unwrap_err();
    assert!(matches!(err, ProtocolError::Protocol(_)));
}

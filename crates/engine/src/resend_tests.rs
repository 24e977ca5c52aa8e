// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use afd_core::olog::OlogEntry;
use afd_storage::InMemoryCounter;
use std::collections::HashMap;
use std::io::Write;

struct Fixture {
    _root: tempfile::TempDir,
    archive_dir: PathBuf,
    log_path: PathBuf,
}

fn build_fixture(job_id: u32, unique_string: &str, filename: &str, contents: &[u8]) -> Fixture {
    let root = tempfile::tempdir().unwrap();
    let archive_dir = root.path().join("archive");
    let file_dir = archive_dir.join(unique_string);
    fs::create_dir_all(&file_dir).unwrap();
    fs::write(file_dir.join(filename), contents).unwrap();

    let entry = OlogEntry {
        date: "20230101120000".to_string(),
        alias: "mirror1".to_string(),
        type_token: "F".to_string(),
        filename: filename.to_string(),
        remote_filename: None,
        size: contents.len() as u64,
        duration: "5".to_string(),
        retries: None,
        job_id: JobId::new(job_id),
        unique_string: unique_string.to_string(),
        archive_dir: archive_dir.to_string_lossy().into_owned(),
    };

    let log_path = root.path().join("output.log");
    let mut f = fs::File::create(&log_path).unwrap();
    writeln!(f, "{}", entry.render()).unwrap();

    Fixture {
        _root: root,
        archive_dir,
        log_path,
    }
}

#[test]
fn stages_a_single_selection_and_builds_a_publishable_batch() {
    let fixture = build_fixture(42, "AB1234", "report.txt", b"hello world");
    let spool = tempfile::tempdir().unwrap();
    let counter = InMemoryCounter::new();

    let mut priorities = HashMap::new();
    priorities.insert(JobId::new(42), 3u8);

    let summary = run_resend(
        &[ResendSelection {
            log_path: fixture.log_path.clone(),
            byte_offset: 0,
        }],
        &priorities,
        |_job_id| Some(HostId::new(7)),
        spool.path(),
        &counter,
        10,
        100,
        1_700_000_000_000,
    )
    .unwrap();

    assert_eq!(summary.batches.len(), 1);
    assert!(!summary.limit_reached);
    let batch = &summary.batches[0];
    assert_eq!(batch.files_to_send, 1);
    assert_eq!(batch.file_size_to_send, 11);
    assert_eq!(batch.host_id, HostId::new(7));
    assert!(batch.not_in_archive.is_empty());

    let staged_path = spool.path().join(&batch.staging_dir).join("report.txt");
    assert_eq!(fs::read(staged_path).unwrap(), b"hello world");

    let events = batch.publish_events(1_700_000_000_000);
    assert!(matches!(events[0], Event::JobEnqueued { .. }));
    assert!(matches!(events[1], Event::HostCountersAdjusted { delta_files: 1, delta_bytes: 11, .. }));
    assert!(matches!(events[2], Event::ResendStaged { .. }));
}

#[test]
fn missing_job_priority_is_an_error() {
    let fixture = build_fixture(5, "XY999", "f.txt", b"abc");
    let spool = tempfile::tempdir().unwrap();
    let counter = InMemoryCounter::new();

    let err = run_resend(
        &[ResendSelection {
            log_path: fixture.log_path.clone(),
            byte_offset: 0,
        }],
        &HashMap::new(),
        |_| Some(HostId::new(1)),
        spool.path(),
        &counter,
        10,
        100,
        0,
    )
    .unwrap_err();

    assert!(matches!(err, ResendError::UnknownJobPriority(id) if id == JobId::new(5)));
}

#[test]
fn resend_limit_stops_after_the_configured_number_of_files() {
    let fixtures = vec![
        build_fixture(1, "A1", "a.txt", b"12345"),
        build_fixture(2, "B2", "b.txt", b"67890"),
    ];
    let spool = tempfile::tempdir().unwrap();
    let counter = InMemoryCounter::new();

    let mut priorities = HashMap::new();
    priorities.insert(JobId::new(1), 1u8);
    priorities.insert(JobId::new(2), 1u8);

    let selections: Vec<_> = fixtures
        .iter()
        .map(|f| ResendSelection {
            log_path: f.log_path.clone(),
            byte_offset: 0,
        })
        .collect();

    let summary = run_resend(
        &selections,
        &priorities,
        |_| Some(HostId::new(1)),
        spool.path(),
        &counter,
        10,
        1,
        0,
    )
    .unwrap();

    assert!(summary.limit_reached);
    assert_eq!(summary.total_staged, 1);
    assert_eq!(summary.batches.len(), 1);
}

#[test]
fn resolve_hosts_maps_job_id_to_the_alias_recorded_in_the_log_line() {
    let fixture = build_fixture(11, "D4", "e.txt", b"data");
    let mut aliases = HashMap::new();
    aliases.insert("mirror1".to_string(), HostId::new(7));

    let hosts = resolve_hosts(
        &[ResendSelection { log_path: fixture.log_path.clone(), byte_offset: 0 }],
        |alias| aliases.get(alias).copied(),
    )
    .unwrap();

    assert_eq!(hosts.get(&JobId::new(11)), Some(&HostId::new(7)));
}

#[test]
fn resolve_hosts_skips_a_job_whose_alias_matches_no_known_host() {
    let fixture = build_fixture(12, "D5", "f.txt", b"data");

    let hosts = resolve_hosts(
        &[ResendSelection { log_path: fixture.log_path.clone(), byte_offset: 0 }],
        |_alias| None,
    )
    .unwrap();

    assert!(hosts.is_empty());
}

#[test]
fn pre_existing_destination_falls_back_to_copy_and_counts_overwrite() {
    let fixture = build_fixture(9, "C3", "dup.txt", b"xyz");
    let spool = tempfile::tempdir().unwrap();
    let counter = InMemoryCounter::new();

    // Pre-create the destination staging directory and file so hard_link
    // fails with EEXIST and the copy fallback must run instead.
    let staging_name = StagingDirName {
        priority: 2,
        creation_time: 0,
        job_id: JobId::new(9),
        split_job_counter: 0,
        unique_number: UniqueNumber::new(0),
        dir_no: RESEND_DIR_NO,
    };
    let staging_dir = spool.path().join(staging_name.format());
    fs::create_dir_all(&staging_dir).unwrap();
    fs::write(staging_dir.join("dup.txt"), b"stale").unwrap();

    let mut priorities = HashMap::new();
    priorities.insert(JobId::new(9), 2u8);

    let summary = run_resend(
        &[ResendSelection {
            log_path: fixture.log_path.clone(),
            byte_offset: 0,
        }],
        &priorities,
        |_| Some(HostId::new(1)),
        spool.path(),
        &counter,
        10,
        100,
        0,
    )
    .unwrap();

    let batch = &summary.batches[0];
    assert_eq!(batch.overwrite_count, 1);
    assert_eq!(batch.files_to_send, 1);
    assert_eq!(fs::read(staging_dir.join("dup.txt")).unwrap(), b"xyz");
    let _ = &fixture.archive_dir;
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use afd_core::{DirId, DirectorySlot, HostId, HostSlot};
use tempfile::TempDir;

/// Builds a `Config` rooted at `dir` directly, rather than through
/// `Config::load()`'s environment variables, so tests can run in parallel
/// without racing on process-wide env state.
fn test_config(dir: &TempDir) -> Config {
    let state_dir = dir.path().to_path_buf();
    Config {
        socket_path: state_dir.join("afd.sock"),
        lock_path: state_dir.join("afd.pid"),
        version_path: state_dir.join("afd.version"),
        log_path: state_dir.join("afd.log"),
        wal_path: state_dir.join("wal").join("events.wal"),
        snapshot_path: state_dir.join("snapshot.json"),
        counter_path: state_dir.join("unique_counter"),
        host_config_path: state_dir.join("host_config.toml"),
        dir_config_path: state_dir.join("dir_config.toml"),
        route_file_path: state_dir.join("route_config.toml"),
        tuning_path: state_dir.join("afd.toml"),
        spool_root: state_dir.join("spool"),
        watch_root: state_dir.join("watch"),
        state_dir,
    }
}

#[tokio::test]
async fn startup_creates_state_dirs_and_binds_socket() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let result = startup(&config).await.unwrap();
    assert!(config.socket_path.exists());
    assert!(config.spool_root.is_dir());
    assert!(config.watch_root.is_dir());
    assert!(config.version_path.exists());

    drop(result.listener);
}

#[tokio::test]
async fn second_startup_against_the_same_state_dir_fails_to_lock() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let first = startup(&config).await.unwrap();
    let second = startup(&config).await;
    assert!(matches!(second.unwrap_err(), LifecycleError::LockFailed(_)));

    // The first daemon's PID file must survive the second's failed attempt.
    assert!(config.lock_path.exists());
    drop(first.listener);
}

#[tokio::test]
async fn startup_recovers_state_from_an_existing_snapshot() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let mut state = MaterializedState::default();
    let host_id = HostId::new(1);
    state.hosts.insert(host_id, HostSlot::new(host_id, "mirror1", 1));
    Snapshot::new(5, state).save(&config.snapshot_path).unwrap();

    let result = startup(&config).await.unwrap();
    assert_eq!(result.daemon.state.lock().hosts.len(), 1);
    assert_eq!(result.daemon.event_bus.processed_seq(), 5);
}

#[tokio::test]
async fn watch_targets_only_covers_push_directories() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let mut state = MaterializedState::default();
    let push_id = DirId::new(1);
    let mut push_dir = DirectorySlot::new(push_id, "outbound");
    push_dir.next_check_time = 0;
    state.dirs.insert(push_id, push_dir);

    let pull_id = DirId::new(2);
    let mut pull_dir = DirectorySlot::new(pull_id, "inbound");
    pull_dir.host_alias = Some("mirror1".into());
    state.dirs.insert(pull_id, pull_dir);

    Snapshot::new(1, state).save(&config.snapshot_path).unwrap();

    let result = startup(&config).await.unwrap();
    let targets = result.daemon.watch_targets();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].dir_id, push_id);
    assert_eq!(targets[0].source_path, config.watch_root.join("outbound"));
}

#[tokio::test]
async fn shutdown_removes_socket_lock_and_version_files() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let result = startup(&config).await.unwrap();
    let daemon = result.daemon;
    drop(result.listener);

    daemon.shutdown().unwrap();
    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
    assert!(!config.version_path.exists());
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use afd_core::host::HostStatusFlags;
use afd_core::{DirId, DirectorySlot, HostId, HostSlot};
use afd_storage::MaterializedState;
use std::sync::Arc;
use tempfile::TempDir;

fn build_config(root: &TempDir) -> crate::config::Config {
    let state_dir = root.path().to_path_buf();
    crate::config::Config {
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

async fn start_daemon(root: &TempDir, state: MaterializedState) -> DaemonState {
    let config = build_config(root);
    afd_storage::Snapshot::new(0, state).save(&config.snapshot_path).unwrap();
    crate::lifecycle::startup(&config).await.unwrap().daemon
}

#[tokio::test]
async fn watch_tick_stages_new_files_into_a_pending_job() {
    let root = TempDir::new().unwrap();
    let mut state = MaterializedState::default();
    let dir_id = DirId::new(1);
    let dir = DirectorySlot::new(dir_id, "outbound");
    state.dirs.insert(dir_id, dir);

    let daemon = start_daemon(&root, state).await;

    let source_dir = daemon.config.watch_root.join("outbound");
    std::fs::create_dir_all(&source_dir).unwrap();
    std::fs::write(source_dir.join("a.dat"), b"hello").unwrap();

    run_watch_tick(&daemon);

    assert_eq!(daemon.state.lock().pending_jobs.len(), 1);
}

#[tokio::test]
async fn watch_tick_is_a_no_op_when_amg_is_disabled() {
    let root = TempDir::new().unwrap();
    let mut state = MaterializedState::default();
    let dir_id = DirId::new(1);
    state.dirs.insert(dir_id, DirectorySlot::new(dir_id, "outbound"));

    let daemon = start_daemon(&root, state).await;
    daemon.toggles.amg_enabled.store(false, Ordering::SeqCst);

    let source_dir = daemon.config.watch_root.join("outbound");
    std::fs::create_dir_all(&source_dir).unwrap();
    std::fs::write(source_dir.join("a.dat"), b"hello").unwrap();

    run_watch_tick(&daemon);

    assert_eq!(daemon.state.lock().pending_jobs.len(), 0);
}

#[tokio::test]
async fn retry_tick_clears_auto_pause_once_the_backoff_timer_fires() {
    let root = TempDir::new().unwrap();
    let mut state = MaterializedState::default();
    let host_id = HostId::new(1);
    let mut host = HostSlot::new(host_id, "mirror1", 1);
    host.host_status.insert(HostStatusFlags::AUTO_PAUSE_QUEUE);
    state.hosts.insert(host_id, host);

    let daemon = start_daemon(&root, state).await;
    daemon.retry.lock().schedule_failure(
        host_id,
        std::time::Instant::now(),
        Duration::from_millis(0),
        Duration::from_millis(0),
    );

    run_retry_tick(&daemon);

    let flags = daemon.state.lock().host(host_id).unwrap().host_status;
    assert!(!flags.contains(HostStatusFlags::AUTO_PAUSE_QUEUE));
}

#[tokio::test]
async fn dispatch_tick_runs_a_job_end_to_end_with_the_loc_adapter() {
    let root = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    let mut state = MaterializedState::default();
    let host_id = HostId::new(1);
    let mut host = HostSlot::new(host_id, "mirror1", 1);
    host.real_hostname[0] = dest.path().display().to_string();
    state.hosts.insert(host_id, host);

    let dir_id = DirId::new(1);
    state.dirs.insert(dir_id, DirectorySlot::new(dir_id, "outbound"));

    let daemon = start_daemon(&root, state).await;
    daemon.routes.lock().insert(dir_id, host_id);

    let source_dir = daemon.config.watch_root.join("outbound");
    std::fs::create_dir_all(&source_dir).unwrap();
    std::fs::write(source_dir.join("a.dat"), b"hello").unwrap();
    run_watch_tick(&daemon);
    assert_eq!(daemon.state.lock().pending_jobs.len(), 1);

    let daemon = Arc::new(daemon);
    run_dispatch_tick(&daemon);

    for _ in 0..50 {
        if daemon.state.lock().pending_jobs.is_empty()
            && !daemon.state.lock().host(host_id).unwrap().job_slots[0].is_owned()
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert!(dest.path().join("a.dat").exists());
    let host_after = daemon.state.lock();
    let host_after = host_after.host(host_id).unwrap();
    assert!(!host_after.job_slots[0].is_owned());
    // Enqueue established a backlog of 1 file; the completed send drains it
    // back to zero (spec §8 scenario 1).
    assert_eq!(host_after.total_file_counter, 0);
}

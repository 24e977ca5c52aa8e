// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, crash recovery.
//!
//! Unlike a system that must reconnect to live external processes on
//! restart, replaying the WAL on top of the last snapshot is sufficient
//! to fully restore HST/DST/the ready queue (SPEC_FULL §3.6) — the
//! scheduler, watcher, and retry loops simply resume ticking against the
//! recovered [`MaterializedState`] on their next iteration.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32};
use std::sync::Arc;
use std::time::Instant;

use afd_engine::{DirectoryWatcher, RetryScheduler, RouteTable, WatchTarget};
use afd_core::{Event, HostId};
use afd_storage::{
    load_dir_config, load_host_config, ConfigError as HostDirConfigError, FileCounter,
    MaterializedState, Snapshot, UniqueCounter, Wal,
};
use fs2::FileExt;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{Config, ConfigError, Tuning};
use crate::event_bus::{EventBus, EventReader};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine state directory")]
    NoStateDir,
    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),
    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),
    #[error("WAL error: {0}")]
    Wal(#[from] afd_storage::WalError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] afd_storage::SnapshotError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("host/directory config error: {0}")]
    HostDirConfig(#[from] HostDirConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Mutable runtime toggles that aren't part of durable HST/DST state: the
/// daemon-wide AMG/FD enable switches (spec §6.1 `AfdCmdOpcode`).
pub struct RuntimeToggles {
    pub amg_enabled: AtomicBool,
    pub fd_enabled: AtomicBool,
}

impl Default for RuntimeToggles {
    fn default() -> Self {
        Self {
            amg_enabled: AtomicBool::new(true),
            fd_enabled: AtomicBool::new(true),
        }
    }
}

/// Everything the running daemon owns for the lifetime of the process.
pub struct DaemonState {
    pub config: Config,
    pub tuning: Tuning,
    #[allow(dead_code)]
    lock_file: File,
    pub state: Arc<Mutex<MaterializedState>>,
    pub event_bus: EventBus,
    pub start_time: Instant,
    pub routes: Arc<Mutex<RouteTable>>,
    pub watcher: Arc<Mutex<DirectoryWatcher>>,
    pub retry: Arc<Mutex<RetryScheduler>>,
    pub toggles: Arc<RuntimeToggles>,
    pub next_proc_id: Arc<AtomicU32>,
    pub next_job_id: Arc<AtomicU32>,
    pub counter: Arc<dyn UniqueCounter>,
    /// Cancellation handle for every worker currently occupying a job slot,
    /// keyed by `(host_id, slot)`. `STOP_TRANSFER` (spec §4.4) cancels
    /// each entry matching a host rather than merely blocking new
    /// dispatch; a slot's entry is removed as soon as its worker returns.
    pub cancellations: Arc<Mutex<HashMap<(HostId, usize), CancellationToken>>>,
}

pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: UnixListener,
    pub event_reader: EventReader,
}

impl DaemonState {
    /// Persist the current in-memory state as the new snapshot and, once
    /// durable, drop WAL entries made redundant by it.
    pub fn checkpoint(&self) -> Result<u64, LifecycleError> {
        let processed_seq = self.event_bus.processed_seq();
        if processed_seq == 0 {
            return Ok(0);
        }
        let state_clone = self.state.lock().clone();
        Snapshot::new(processed_seq, state_clone).save(&self.config.snapshot_path)?;
        let wal = self.event_bus.wal();
        wal.lock().truncate_before(processed_seq)?;
        Ok(processed_seq)
    }

    pub fn shutdown(&self) -> Result<(), LifecycleError> {
        info!("shutting down daemon");

        if let Err(e) = self.event_bus.flush() {
            warn!(error = %e, "failed to flush WAL on shutdown");
        }

        let processed_seq = self.event_bus.processed_seq();
        if processed_seq > 0 {
            let state_clone = self.state.lock().clone();
            match Snapshot::new(processed_seq, state_clone).save(&self.config.snapshot_path) {
                Ok(()) => info!(seq = processed_seq, "saved final shutdown snapshot"),
                Err(e) => warn!(error = %e, "failed to save shutdown snapshot"),
            }
        }

        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!(error = %e, "failed to remove socket file");
            }
        }
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!(error = %e, "failed to remove PID file");
            }
        }
        if self.config.version_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.version_path) {
                warn!(error = %e, "failed to remove version file");
            }
        }

        info!("daemon shutdown complete");
        Ok(())
    }

    /// Directory watch targets for every push directory (no `host_alias`
    /// association) currently in DST (SPEC_FULL §3.10).
    pub fn watch_targets(&self) -> Vec<WatchTarget> {
        let state = self.state.lock();
        state
            .dirs
            .values()
            .filter(|d| !d.is_pull_directory())
            .map(|d| WatchTarget {
                dir_id: d.dir_id,
                source_path: self.config.watch_root.join(&d.dir_alias),
                scan_interval_ms: self.tuning.watch_scan_interval_ms,
            })
            .collect()
    }
}

pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // The lock-holder's files belong to the already-running
            // daemon; don't tear anything down in that case.
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

fn cleanup_on_failure(config: &Config) {
    let _ = std::fs::remove_file(&config.socket_path);
    let _ = std::fs::remove_file(&config.lock_path);
    let _ = std::fs::remove_file(&config.version_path);
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Acquire the lock before truncating the file, so a failed lock
    // attempt never wipes the running daemon's PID.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    if let Some(parent) = config.wal_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::create_dir_all(&config.spool_root)?;
    std::fs::create_dir_all(&config.watch_root)?;

    std::fs::write(&config.version_path, crate::protocol::protocol_version())?;

    let tuning = Tuning::load(&config.tuning_path)?;

    let (mut state, processed_seq) = match Snapshot::load(&config.snapshot_path)? {
        Some(snapshot) => {
            info!(
                seq = snapshot.seq,
                hosts = snapshot.state.hosts.len(),
                dirs = snapshot.state.dirs.len(),
                "loaded snapshot"
            );
            (snapshot.state, snapshot.seq)
        }
        None => {
            info!("no snapshot found, starting with empty state");
            (MaterializedState::default(), 0)
        }
    };

    let event_wal = Wal::open(&config.wal_path, processed_seq)?;
    let events_to_replay = event_wal.entries_after(processed_seq)?;
    let (event_bus, event_reader) = EventBus::new(event_wal);
    let replay_count = events_to_replay.len();
    for entry in events_to_replay {
        state.apply_event(&entry.event);
    }
    if replay_count > 0 {
        info!(replay_count, after_seq = processed_seq, "replayed WAL entries");
    }

    // Config files are optional: an absent file just means "nothing
    // configured yet", not a startup failure.
    if config.host_config_path.exists() {
        let hosts = load_host_config(&config.host_config_path)?;
        let event = Event::HostConfigReloaded { hosts };
        event_bus.send(event.clone())?;
        state.apply_event(&event);
    }
    if config.dir_config_path.exists() {
        let dirs = load_dir_config(&config.dir_config_path)?;
        let event = Event::DirConfigReloaded { dirs };
        event_bus.send(event.clone())?;
        state.apply_event(&event);
    }

    let routes = RouteTable::load(&config.route_file_path).unwrap_or_else(|e| {
        warn!(error = %e, "no usable route file, starting with an empty route table");
        RouteTable::new()
    });

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    let state = Arc::new(Mutex::new(state));

    let daemon = DaemonState {
        config: config.clone(),
        tuning,
        lock_file,
        state,
        event_bus,
        start_time: Instant::now(),
        routes: Arc::new(Mutex::new(routes)),
        watcher: Arc::new(Mutex::new(DirectoryWatcher::new(Vec::new()))),
        retry: Arc::new(Mutex::new(RetryScheduler::new())),
        toggles: Arc::new(RuntimeToggles::default()),
        next_proc_id: Arc::new(AtomicU32::new(1)),
        next_job_id: Arc::new(AtomicU32::new(1)),
        counter: Arc::new(FileCounter::new(config.counter_path.clone())),
        cancellations: Arc::new(Mutex::new(HashMap::new())),
    };

    let targets = daemon.watch_targets();
    *daemon.watcher.lock() = DirectoryWatcher::new(targets);

    Ok(StartupResult {
        daemon,
        listener,
        event_reader,
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

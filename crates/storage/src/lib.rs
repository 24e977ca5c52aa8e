// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable storage for the Automatic File Distribution engine: the WAL,
//! snapshot/checkpoint persistence, host/directory config parsing, the
//! unique counter service, and the materialized HST/DST state they all
//! feed into.

mod checkpoint;
mod config;
mod counter;
mod migration;
mod snapshot;
mod state;
mod wal;

pub use checkpoint::{
    load_snapshot, CheckpointError, CheckpointHandle, CheckpointResult, CheckpointWriter,
    Checkpointer, FsCheckpointWriter,
};
pub use config::{
    load_dir_config, load_host_config, ConfigError, SUPPORTED_DIR_CONFIG_VERSION,
    SUPPORTED_HOST_CONFIG_VERSION,
};
pub use counter::{peek as peek_counter, CounterError, FileCounter, InMemoryCounter, UniqueCounter};
pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use snapshot::{Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::{MaterializedState, PendingJob};
pub use wal::{Wal, WalEntry, WalError};

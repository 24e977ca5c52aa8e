// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background checkpointing with zstd compression and durable fsync.
//!
//! The checkpointer runs I/O off the main thread while ensuring durability
//! guarantees for crash recovery. The key invariant: snapshot must be
//! durable (including directory fsync) before WAL truncation.
//!
//! ## Design
//!
//! ```text
//! Main Thread                    Background Thread
//! ───────────────────────────    ─────────────────────────────
//! clone state
//!   │
//!   └─────────────────────────→  serialize + compress
//!                                write to .tmp
//!                                fsync .tmp
//!                                rename → snapshot
//!                                fsync directory
//!                                  │
//!   ←────────────────────────────┘ (completion signal)
//! truncate WAL (safe now)
//! ```

use crate::snapshot::{Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
use crate::state::MaterializedState;
use chrono::Utc;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("compression error: {0}")]
    Compress(String),
    #[error("checkpoint failed: {0}")]
    Failed(String),
}

/// Result of a completed checkpoint
#[derive(Debug, Clone)]
pub struct CheckpointResult {
    pub seq: u64,
    pub size_bytes: u64,
}

/// Trait abstracting checkpoint I/O for testability.
pub trait CheckpointWriter: Send + Sync + 'static {
    fn write_tmp(&self, path: &Path, data: &[u8]) -> Result<(), CheckpointError>;
    fn fsync_file(&self, path: &Path) -> Result<(), CheckpointError>;
    fn rename(&self, from: &Path, to: &Path) -> Result<(), CheckpointError>;
    fn fsync_dir(&self, path: &Path) -> Result<(), CheckpointError>;
    fn file_size(&self, path: &Path) -> Result<u64, CheckpointError>;
}

/// Production checkpoint writer using real filesystem operations.
#[derive(Clone)]
pub struct FsCheckpointWriter;

impl CheckpointWriter for FsCheckpointWriter {
    fn write_tmp(&self, path: &Path, data: &[u8]) -> Result<(), CheckpointError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(data)?;
        Ok(())
    }

    fn fsync_file(&self, path: &Path) -> Result<(), CheckpointError> {
        File::open(path)?.sync_all()?;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), CheckpointError> {
        std::fs::rename(from, to)?;
        Ok(())
    }

    fn fsync_dir(&self, path: &Path) -> Result<(), CheckpointError> {
        File::open(path)?.sync_all()?;
        Ok(())
    }

    fn file_size(&self, path: &Path) -> Result<u64, CheckpointError> {
        Ok(std::fs::metadata(path)?.len())
    }
}

/// Handle to a running checkpoint operation.
pub struct CheckpointHandle {
    pub seq: u64,
    receiver: mpsc::Receiver<Result<CheckpointResult, CheckpointError>>,
    #[allow(dead_code)]
    handle: JoinHandle<()>,
}

impl CheckpointHandle {
    /// Block until the snapshot is fully durable (including directory
    /// fsync). Only after this returns is it safe to truncate the WAL.
    pub fn wait(self) -> Result<CheckpointResult, CheckpointError> {
        self.receiver
            .recv()
            .map_err(|_| CheckpointError::Failed("checkpoint thread panicked".into()))?
    }

    pub fn try_wait(&self) -> Option<Result<CheckpointResult, CheckpointError>> {
        self.receiver.try_recv().ok()
    }
}

/// Manages background snapshot operations.
pub struct Checkpointer<W: CheckpointWriter = FsCheckpointWriter> {
    writer: W,
    snapshot_path: PathBuf,
    compression_level: i32,
}

impl Checkpointer<FsCheckpointWriter> {
    pub fn new(snapshot_path: PathBuf) -> Self {
        Self::with_writer(FsCheckpointWriter, snapshot_path)
    }
}

impl<W: CheckpointWriter + Clone> Checkpointer<W> {
    pub fn with_writer(writer: W, snapshot_path: PathBuf) -> Self {
        Self {
            writer,
            snapshot_path,
            compression_level: 3,
        }
    }

    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    /// Start a background checkpoint. Clones the state and spawns a thread
    /// to serialize, compress, and write the snapshot. The returned handle
    /// must be waited on before truncating the WAL.
    pub fn start(&self, seq: u64, state: &MaterializedState) -> CheckpointHandle {
        let state_clone = state.clone();
        let writer = self.writer.clone();
        let snapshot_path = self.snapshot_path.clone();
        let compression_level = self.compression_level;

        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let result = checkpoint_blocking(
                &writer,
                seq,
                &state_clone,
                &snapshot_path,
                compression_level,
            );
            let _ = tx.send(result);
        });

        CheckpointHandle {
            seq,
            receiver: rx,
            handle,
        }
    }

    /// Perform a synchronous checkpoint (used for shutdown).
    pub fn checkpoint_sync(
        &self,
        seq: u64,
        state: &MaterializedState,
    ) -> Result<CheckpointResult, CheckpointError> {
        checkpoint_blocking(
            &self.writer,
            seq,
            state,
            &self.snapshot_path,
            self.compression_level,
        )
    }
}

fn checkpoint_blocking<W: CheckpointWriter>(
    writer: &W,
    seq: u64,
    state: &MaterializedState,
    snapshot_path: &Path,
    compression_level: i32,
) -> Result<CheckpointResult, CheckpointError> {
    let tmp_path = snapshot_path.with_extension("tmp");

    let snapshot = Snapshot {
        version: CURRENT_SNAPSHOT_VERSION,
        seq,
        state: state.clone(),
        created_at: Utc::now(),
    };

    let json_bytes = serde_json::to_vec(&snapshot)?;
    let compressed = zstd::encode_all(json_bytes.as_slice(), compression_level)
        .map_err(|e| CheckpointError::Compress(e.to_string()))?;

    writer.write_tmp(&tmp_path, &compressed)?;
    writer.fsync_file(&tmp_path)?;
    writer.rename(&tmp_path, snapshot_path)?;

    if let Some(parent) = snapshot_path.parent() {
        writer.fsync_dir(parent)?;
    }

    let size_bytes = writer
        .file_size(snapshot_path)
        .unwrap_or(compressed.len() as u64);

    Ok(CheckpointResult { seq, size_bytes })
}

/// Load a zstd-compressed, versioned snapshot from disk.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    Snapshot::load(path)
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unique Counter Service: hands out disjoint ranges of a monotonically
//! increasing 32-bit counter for staging-directory names (spec §4.7).
//!
//! Wrap-around at `u32::MAX` is permitted; uniqueness within a single
//! creation-time second is guaranteed by composing the counter with the
//! creation time, `job_id`, and split-job counter into the directory name,
//! not by the counter alone.

use afd_core::UniqueNumber;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CounterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("counter file contents are not a valid u32")]
    Corrupt,
}

/// Allocates contiguous ranges of unique numbers. The file-backed impl is
/// the production allocator; tests use [`InMemoryCounter`] instead of
/// touching the filesystem.
pub trait UniqueCounter: Send + Sync {
    /// Allocate `count` consecutive numbers and return the first one.
    fn allocate(&self, count: u32) -> Result<UniqueNumber, CounterError>;
}

/// Exclusive file-locked 32-bit counter on disk, matching the on-disk
/// format `open_counter_file` expects: a 4-byte little-endian value.
pub struct FileCounter {
    path: PathBuf,
}

impl FileCounter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open(&self) -> Result<File, CounterError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.path)?)
    }
}

impl UniqueCounter for FileCounter {
    fn allocate(&self, count: u32) -> Result<UniqueNumber, CounterError> {
        let mut file = self.open()?;
        file.lock_exclusive()?;

        let result = (|| {
            let mut buf = [0u8; 4];
            let read = file.read(&mut buf)?;
            let current = if read == 4 {
                u32::from_le_bytes(buf)
            } else if read == 0 {
                0
            } else {
                return Err(CounterError::Corrupt);
            };

            let next = current.wrapping_add(count);
            file.seek(SeekFrom::Start(0))?;
            file.write_all(&next.to_le_bytes())?;
            file.sync_data()?;
            Ok(UniqueNumber::new(current))
        })();

        FileExt::unlock(&file)?;
        result
    }
}

/// In-memory allocator for tests: no filesystem, no locking, just an
/// atomic counter.
#[derive(Debug, Default)]
pub struct InMemoryCounter {
    next: AtomicU32,
}

impl InMemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(value: u32) -> Self {
        Self {
            next: AtomicU32::new(value),
        }
    }
}

impl UniqueCounter for InMemoryCounter {
    fn allocate(&self, count: u32) -> Result<UniqueNumber, CounterError> {
        let current = self.next.fetch_add(count, Ordering::SeqCst);
        Ok(UniqueNumber::new(current))
    }
}

/// Read the raw counter value from `path` without advancing it, for
/// diagnostics/snapshots. Returns 0 if the file does not exist yet.
pub fn peek(path: &Path) -> Result<u32, CounterError> {
    if !path.exists() {
        return Ok(0);
    }
    let mut file = File::open(path)?;
    let mut buf = [0u8; 4];
    let read = file.read(&mut buf)?;
    if read == 0 {
        Ok(0)
    } else if read == 4 {
        Ok(u32::from_le_bytes(buf))
    } else {
        Err(CounterError::Corrupt)
    }
}

#[cfg(test)]
#[path = "counter_tests.rs"]
mod tests;

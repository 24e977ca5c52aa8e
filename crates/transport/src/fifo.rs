// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The message bus abstraction (C3, spec §4.3, §6.1, §6.2): a `Fifo` trait
//! with fixed-length framing and blocking-with-backpressure semantics,
//! backed in production by a real POSIX named pipe and in tests/in-process
//! use by an in-memory channel pair.

use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum FifoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("fifo creation failed: {0}")]
    Create(#[from] nix::Error),
    #[error("message length {actual} does not match expected frame length {expected}")]
    WrongLength { expected: usize, actual: usize },
    #[error("the other end of the fifo is gone")]
    Closed,
}

/// A blocking message channel with fixed-length framing, modeling one end
/// of a named pipe. `write_message` blocks until the peer has read (or
/// buffered) the frame; `read_message` blocks until `len` bytes are
/// available, giving the same backpressure a real fifo provides.
pub trait Fifo: Send {
    fn write_message(&mut self, bytes: &[u8]) -> Result<(), FifoError>;
    fn read_message(&mut self, len: usize) -> Result<Vec<u8>, FifoError>;
}

fn ensure_fifo(path: &Path) -> Result<(), FifoError> {
    if !path.exists() {
        mkfifo(path, Mode::from_bits_truncate(0o600))?;
    }
    Ok(())
}

/// A real POSIX named pipe. Opening blocks until a peer opens the other
/// end, exactly like the original system's cooperating processes.
pub struct UnixFifo {
    path: PathBuf,
    file: File,
}

impl UnixFifo {
    /// Create (if needed) and open `path` for reading. Blocks until a
    /// writer opens the same path.
    pub fn open_reader(path: impl Into<PathBuf>) -> Result<Self, FifoError> {
        let path = path.into();
        ensure_fifo(&path)?;
        let file = OpenOptions::new().read(true).open(&path)?;
        Ok(Self { path, file })
    }

    /// Create (if needed) and open `path` for writing. Blocks until a
    /// reader opens the same path.
    pub fn open_writer(path: impl Into<PathBuf>) -> Result<Self, FifoError> {
        let path = path.into();
        ensure_fifo(&path)?;
        let file = OpenOptions::new().write(true).open(&path)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Fifo for UnixFifo {
    fn write_message(&mut self, bytes: &[u8]) -> Result<(), FifoError> {
        self.file.write_all(bytes)?;
        self.file.flush()?;
        Ok(())
    }

    fn read_message(&mut self, len: usize) -> Result<Vec<u8>, FifoError> {
        let mut buf = vec![0u8; len];
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// In-memory stand-in for a named pipe, for tests and the in-process
/// AMG-equivalent directory watcher (SPEC_FULL §3.10). Each end is created
/// in a connected pair; dropping one end makes the other's next call
/// return `FifoError::Closed`.
pub struct ChannelFifo {
    tx: mpsc::Sender<Vec<u8>>,
    rx: mpsc::Receiver<Vec<u8>>,
}

impl ChannelFifo {
    /// Create a connected pair, analogous to opening both ends of a named
    /// pipe in the same process. `capacity` bounds how many frames may be
    /// in flight before `write_message` blocks.
    pub fn pair(capacity: usize) -> (ChannelFifo, ChannelFifo) {
        let (tx_a, rx_a) = mpsc::channel(capacity);
        let (tx_b, rx_b) = mpsc::channel(capacity);
        (
            ChannelFifo { tx: tx_a, rx: rx_b },
            ChannelFifo { tx: tx_b, rx: rx_a },
        )
    }
}

impl Fifo for ChannelFifo {
    fn write_message(&mut self, bytes: &[u8]) -> Result<(), FifoError> {
        self.tx
            .blocking_send(bytes.to_vec())
            .map_err(|_| FifoError::Closed)
    }

    fn read_message(&mut self, len: usize) -> Result<Vec<u8>, FifoError> {
        let msg = self.rx.blocking_recv().ok_or(FifoError::Closed)?;
        if msg.len() != len {
            return Err(FifoError::WrongLength {
                expected: len,
                actual: msg.len(),
            });
        }
        Ok(msg)
    }
}

#[cfg(test)]
#[path = "fifo_tests.rs"]
mod tests;

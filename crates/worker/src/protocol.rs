// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The capability set a protocol worker drives: connect, send one file,
//! disconnect (spec §4.5). Real network protocols (FTP/SFTP/SMTP/...) are
//! out of scope; this trait is the seam a real implementation would plug
//! into, with `loc` (same-filesystem copy) the one adapter this workspace
//! ships for real.

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connect to {0} failed: {1}")]
    Connect(String, String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// One protocol session's capability set. A fresh adapter instance is
/// created per job; `connect`/`disconnect` bracket the session and
/// `send_file` is called once per file in the job.
pub trait ProtocolAdapter: Send {
    /// Open a session to `hostname`. Called once, before any transfer.
    fn connect(&mut self, hostname: &str) -> Result<(), ProtocolError>;

    /// Send one local file, reporting cumulative bytes written so far via
    /// `on_progress` as the transfer proceeds. Returns the total bytes
    /// sent for this file.
    fn send_file(
        &mut self,
        local_path: &Path,
        remote_name: &str,
        on_progress: &mut dyn FnMut(u64),
    ) -> Result<u64, ProtocolError>;

    /// Tear down the session. Called on every terminal state, including
    /// cancellation, so implementations must tolerate a partial transfer.
    fn disconnect(&mut self) -> Result<(), ProtocolError>;
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

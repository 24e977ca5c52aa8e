// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus for daemon communication.
//!
//! The `EventBus` writes events to the WAL before notifying the engine
//! loop, enabling crash recovery via snapshot + replay. Events are
//! buffered in memory and periodically flushed to disk (SPEC_FULL §3.6).

use afd_core::Event;
use afd_storage::{Wal, WalEntry, WalError};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Event bus backed by a WAL. Cloning shares the same underlying log.
#[derive(Clone)]
pub struct EventBus {
    wal: Arc<Mutex<Wal>>,
    wake_tx: mpsc::Sender<()>,
}

/// Reader half of the bus; the dispatch loop drains events from this.
pub struct EventReader {
    wal: Arc<Mutex<Wal>>,
    wake_rx: mpsc::Receiver<()>,
}

impl EventBus {
    /// Create a new event bus backed by the given WAL. Returns both the
    /// bus (for sending) and reader (for receiving).
    pub fn new(wal: Wal) -> (Self, EventReader) {
        let wal = Arc::new(Mutex::new(wal));
        let (wake_tx, wake_rx) = mpsc::channel(1);

        (
            Self {
                wal: Arc::clone(&wal),
                wake_tx,
            },
            EventReader { wal, wake_rx },
        )
    }

    /// Append an event to the WAL (buffered, not yet durable). Returns
    /// the assigned sequence number; call `flush()` to make it durable.
    pub fn send(&self, event: Event) -> Result<u64, WalError> {
        let seq = {
            let mut wal = self.wal.lock();
            wal.append(&event)?
        };
        // Non-blocking wake: if the channel is already full, the reader
        // is already awake and will see this entry on its next poll.
        let _ = self.wake_tx.try_send(());
        Ok(seq)
    }

    /// Flush the WAL to disk with a single fsync.
    pub fn flush(&self) -> Result<(), WalError> {
        let mut wal = self.wal.lock();
        wal.flush()
    }

    pub fn needs_flush(&self) -> bool {
        let wal = self.wal.lock();
        wal.needs_flush()
    }

    pub fn processed_seq(&self) -> u64 {
        let wal = self.wal.lock();
        wal.processed_seq()
    }

    pub fn wal(&self) -> Arc<Mutex<Wal>> {
        Arc::clone(&self.wal)
    }
}

impl EventReader {
    /// Wait for and return the next unprocessed event. Returns `None`
    /// once the bus is closed (every `EventBus` clone dropped).
    pub async fn recv(&mut self) -> Result<Option<WalEntry>, WalError> {
        loop {
            {
                let mut wal = self.wal.lock();
                if let Some(entry) = wal.next_unprocessed()? {
                    return Ok(Some(entry));
                }
            }

            if self.wake_rx.recv().await.is_none() {
                return Ok(None);
            }
        }
    }

    /// Mark an entry as processed. Durability comes from the next
    /// snapshot, not from this call.
    pub fn mark_processed(&self, seq: u64) {
        let mut wal = self.wal.lock();
        wal.mark_processed(seq);
    }

    pub fn wal(&self) -> Arc<Mutex<Wal>> {
        Arc::clone(&self.wal)
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;

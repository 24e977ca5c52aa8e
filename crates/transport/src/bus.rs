// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed framing on top of [`Fifo`] for the two payload kinds the bus
//! carries: fixed-length job messages (spec §6.2) and variable-length
//! delivery confirmations (spec §6.3).

use crate::fifo::{Fifo, FifoError};
use afd_core::confirmation::{ConfirmationError, ConfirmationMessage};
use afd_core::job_message::JobMessageError;
use afd_core::{JobMessage, MAX_BIN_MSG_LENGTH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error(transparent)]
    Fifo(#[from] FifoError),
    #[error(transparent)]
    JobMessage(#[from] JobMessageError),
    #[error(transparent)]
    Confirmation(#[from] ConfirmationError),
    #[error("confirmation frame length {0} exceeds u32 range")]
    FrameTooLarge(usize),
}

/// Job message bus: every frame is exactly `MAX_BIN_MSG_LENGTH` bytes,
/// matching the original "fits in a single atomic fifo write" contract.
pub struct JobBus<F: Fifo> {
    fifo: F,
}

impl<F: Fifo> JobBus<F> {
    pub fn new(fifo: F) -> Self {
        Self { fifo }
    }

    pub fn send(&mut self, message: &JobMessage) -> Result<(), BusError> {
        self.fifo.write_message(&message.encode())?;
        Ok(())
    }

    pub fn recv(&mut self) -> Result<JobMessage, BusError> {
        let bytes = self.fifo.read_message(MAX_BIN_MSG_LENGTH)?;
        Ok(JobMessage::decode(&bytes)?)
    }
}

/// Delivery-confirmation bus: frames are variable length, so each frame is
/// preceded by a 4-byte little-endian length prefix written as its own
/// `Fifo` message.
pub struct ConfirmationBus<F: Fifo> {
    fifo: F,
}

impl<F: Fifo> ConfirmationBus<F> {
    pub fn new(fifo: F) -> Self {
        Self { fifo }
    }

    pub fn send(&mut self, message: &ConfirmationMessage) -> Result<(), BusError> {
        let bytes = message.encode()?;
        let len: u32 = bytes
            .len()
            .try_into()
            .map_err(|_| BusError::FrameTooLarge(bytes.len()))?;
        self.fifo.write_message(&len.to_le_bytes())?;
        self.fifo.write_message(&bytes)?;
        Ok(())
    }

    pub fn recv(&mut self) -> Result<ConfirmationMessage, BusError> {
        let len_bytes = self.fifo.read_message(4)?;
        let len = u32::from_le_bytes(len_bytes.try_into().unwrap_or([0; 4])) as usize;
        let bytes = self.fifo.read_message(len)?;
        Ok(ConfirmationMessage::decode(&bytes)?)
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;

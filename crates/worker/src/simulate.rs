// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SIMULATE_SEND_MODE` adapter: reports every transfer as succeeding
//! without touching the network or filesystem, used to rehearse dispatch
//! and retry logic against a live host catalogue without moving bytes.

use crate::protocol::{ProtocolAdapter, ProtocolError};
use std::fs;
use std::path::Path;

pub struct SimulateAdapter {
    connected: bool,
}

impl SimulateAdapter {
    pub fn new() -> Self {
        Self { connected: false }
    }
}

impl Default for SimulateAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolAdapter for SimulateAdapter {
    fn connect(&mut self, _hostname: &str) -> Result<(), ProtocolError> {
        self.connected = true;
        Ok(())
    }

    fn send_file(
        &mut self,
        local_path: &Path,
        _remote_name: &str,
        on_progress: &mut dyn FnMut(u64),
    ) -> Result<u64, ProtocolError> {
        if !self.connected {
            return Err(ProtocolError::Protocol(
                "send_file called before connect".into(),
            ));
        }
        let size = fs::metadata(local_path)?.len();
        on_progress(size);
        Ok(size)
    }

    fn disconnect(&mut self) -> Result<(), ProtocolError> {
        self.connected = false;
        Ok(())
    }
}

#[cfg(test)]
#[path = "simulate_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A scriptable [`ProtocolAdapter`] test double, gated behind `test-support`
//! so the state machine's own tests (and downstream crates exercising
//! dispatch) can inject specific failures and inspect call order without a
//! real filesystem or network hop.

use crate::protocol::{ProtocolAdapter, ProtocolError};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    Connect(String),
    SendFile(String, String),
    Disconnect,
}

#[derive(Debug, Clone, Default)]
pub struct FakeScript {
    pub fail_connect: Option<String>,
    pub fail_send_on_file: Option<usize>,
    pub fail_disconnect: Option<String>,
    pub file_size: u64,
}

pub struct FakeAdapter {
    script: FakeScript,
    calls: Arc<Mutex<Vec<FakeCall>>>,
    files_sent: usize,
}

impl FakeAdapter {
    pub fn new(script: FakeScript) -> Self {
        Self {
            script,
            calls: Arc::new(Mutex::new(Vec::new())),
            files_sent: 0,
        }
    }

    pub fn calls_handle(&self) -> Arc<Mutex<Vec<FakeCall>>> {
        Arc::clone(&self.calls)
    }
}

impl ProtocolAdapter for FakeAdapter {
    fn connect(&mut self, hostname: &str) -> Result<(), ProtocolError> {
        self.calls.lock().push(FakeCall::Connect(hostname.to_string()));
        if let Some(reason) = &self.script.fail_connect {
            return Err(ProtocolError::Connect(hostname.to_string(), reason.clone()));
        }
        Ok(())
    }

    fn send_file(
        &mut self,
        local_path: &Path,
        remote_name: &str,
        on_progress: &mut dyn FnMut(u64),
    ) -> Result<u64, ProtocolError> {
        self.calls.lock().push(FakeCall::SendFile(
            local_path.display().to_string(),
            remote_name.to_string(),
        ));
        let index = self.files_sent;
        self.files_sent += 1;
        if self.script.fail_send_on_file == Some(index) {
            return Err(ProtocolError::Protocol(format!(
                "scripted failure on file index {index}"
            )));
        }
        let size = if self.script.file_size > 0 {
            self.script.file_size
        } else {
            local_path
                .metadata()
                .map(|m| m.len())
                .unwrap_or_default()
        };
        on_progress(size);
        Ok(size)
    }

    fn disconnect(&mut self) -> Result<(), ProtocolError> {
        self.calls.lock().push(FakeCall::Disconnect);
        if let Some(reason) = &self.script.fail_disconnect {
            return Err(ProtocolError::Protocol(reason.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

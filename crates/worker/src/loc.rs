// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `LOC` adapter: a same-filesystem copy, matching the original's local
//! transfer protocol. `hostname` is interpreted as a destination directory
//! path rather than a network address.

use crate::protocol::{ProtocolAdapter, ProtocolError};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const COPY_CHUNK_SIZE: usize = 64 * 1024;

pub struct LocAdapter {
    destination_dir: Option<PathBuf>,
}

impl LocAdapter {
    pub fn new() -> Self {
        Self {
            destination_dir: None,
        }
    }
}

impl Default for LocAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolAdapter for LocAdapter {
    fn connect(&mut self, hostname: &str) -> Result<(), ProtocolError> {
        let dir = PathBuf::from(hostname);
        fs::create_dir_all(&dir)
            .map_err(|e| ProtocolError::Connect(hostname.to_string(), e.to_string()))?;
        self.destination_dir = Some(dir);
        Ok(())
    }

    fn send_file(
        &mut self,
        local_path: &Path,
        remote_name: &str,
        on_progress: &mut dyn FnMut(u64),
    ) -> Result<u64, ProtocolError> {
        let dest_dir = self
            .destination_dir
            .as_ref()
            .ok_or_else(|| ProtocolError::Protocol("send_file called before connect".into()))?;

        let mut reader = File::open(local_path)?;
        let mut writer = File::create(dest_dir.join(remote_name))?;

        let mut buf = vec![0u8; COPY_CHUNK_SIZE];
        let mut total = 0u64;
        loop {
            let read = reader.read(&mut buf)?;
            if read == 0 {
                break;
            }
            writer.write_all(&buf[..read])?;
            total += read as u64;
            on_progress(total);
        }
        writer.sync_all()?;
        Ok(total)
    }

    fn disconnect(&mut self) -> Result<(), ProtocolError> {
        self.destination_dir = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "loc_tests.rs"]
mod tests;

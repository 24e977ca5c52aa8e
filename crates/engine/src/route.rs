// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The directory-to-host routing table (the "LOC interface file" spec §4.4
//! refers to via `REREAD_LOC_INTERFACE_FILE`): which host a directory's
//! outgoing jobs are destined for. Kept separate from `DirectorySlot` since
//! that type's `host_alias` models only the pull/retrieve association
//! (spec §3.2); a push directory's destination is configured here instead.

use afd_core::{DirId, HostId};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const SUPPORTED_ROUTE_FILE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path} as TOML: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("unsupported route file version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
}

#[derive(Debug, Deserialize)]
struct RouteFile {
    version: u32,
    routes: Vec<RouteEntry>,
}

#[derive(Debug, Deserialize)]
struct RouteEntry {
    dir_id: DirId,
    host_id: HostId,
}

/// Resolves a directory's single destination host for push traffic.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<DirId, HostId>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dir_id: DirId, host_id: HostId) {
        self.routes.insert(dir_id, host_id);
    }

    pub fn host_for(&self, dir_id: DirId) -> Option<HostId> {
        self.routes.get(&dir_id).copied()
    }

    pub fn load(path: &Path) -> Result<Self, RouteError> {
        let text = std::fs::read_to_string(path).map_err(|source| RouteError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file: RouteFile = toml::from_str(&text).map_err(|source| RouteError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        if file.version != SUPPORTED_ROUTE_FILE_VERSION {
            return Err(RouteError::UnsupportedVersion {
                found: file.version,
                expected: SUPPORTED_ROUTE_FILE_VERSION,
            });
        }

        let mut routes = HashMap::new();
        for entry in file.routes {
            routes.insert(entry.dir_id, entry.host_id);
        }
        Ok(Self { routes })
    }
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;

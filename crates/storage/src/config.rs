// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host-config and directory-config file parsing.
//!
//! Both files are versioned TOML documents. A parse or id-uniqueness
//! failure aborts the reload entirely rather than partially applying it,
//! so a malformed edit never leaves HST/DST in a mixed state.

use afd_core::event::{DirConfigEntry, HostConfigEntry};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

pub const SUPPORTED_HOST_CONFIG_VERSION: u32 = 1;
pub const SUPPORTED_DIR_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("host config version {found} is not supported (expected {expected})")]
    UnsupportedHostVersion { found: u32, expected: u32 },
    #[error("directory config version {found} is not supported (expected {expected})")]
    UnsupportedDirVersion { found: u32, expected: u32 },
    #[error("duplicate host_id {0} in host config")]
    DuplicateHostId(u32),
    #[error("duplicate dir_id {0} in directory config")]
    DuplicateDirId(u32),
}

#[derive(Debug, Clone, Deserialize)]
struct HostConfigFile {
    version: u32,
    #[serde(default)]
    hosts: Vec<HostConfigEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct DirConfigFile {
    version: u32,
    #[serde(default)]
    dirs: Vec<DirConfigEntry>,
}

/// Load and validate the host-config file at `path`. Returns the parsed
/// entries in file order; the reconciler (`MaterializedState::apply_event`
/// via `Event::HostConfigReloaded`) is responsible for diffing against the
/// live table.
pub fn load_host_config(path: &Path) -> Result<Vec<HostConfigEntry>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let parsed: HostConfigFile = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    if parsed.version != SUPPORTED_HOST_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedHostVersion {
            found: parsed.version,
            expected: SUPPORTED_HOST_CONFIG_VERSION,
        });
    }

    let mut seen = HashSet::new();
    for host in &parsed.hosts {
        if !seen.insert(host.host_id) {
            return Err(ConfigError::DuplicateHostId(host.host_id.get()));
        }
    }

    Ok(parsed.hosts)
}

/// Load and validate the directory-config file at `path`.
pub fn load_dir_config(path: &Path) -> Result<Vec<DirConfigEntry>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let parsed: DirConfigFile = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    if parsed.version != SUPPORTED_DIR_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedDirVersion {
            found: parsed.version,
            expected: SUPPORTED_DIR_CONFIG_VERSION,
        });
    }

    let mut seen = HashSet::new();
    for dir in &parsed.dirs {
        if !seen.insert(dir.dir_id) {
            return Err(ConfigError::DuplicateDirId(dir.dir_id.get()));
        }
    }

    Ok(parsed.dirs)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

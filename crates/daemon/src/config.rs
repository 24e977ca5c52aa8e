// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: where its durable state lives on disk, and the
//! runtime tuning knobs read from `afd.toml` at startup (SPEC_FULL §3.6).

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const SUPPORTED_TUNING_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine state directory (no HOME and no AFD_STATE_DIR)")]
    NoStateDir,
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
    #[error("afd.toml version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Resolve the root state directory: `AFD_STATE_DIR` overrides,
/// otherwise `$XDG_STATE_HOME/afd`, otherwise `~/.local/state/afd`.
fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("AFD_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("afd"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/afd"))
}

/// Every path the daemon reads or writes, derived once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub version_path: PathBuf,
    pub log_path: PathBuf,
    pub wal_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub counter_path: PathBuf,
    pub host_config_path: PathBuf,
    pub dir_config_path: PathBuf,
    pub route_file_path: PathBuf,
    pub tuning_path: PathBuf,
    pub spool_root: PathBuf,
    /// Root under which each push directory's watched source path lives,
    /// as `watch_root/<dir_alias>` (SPEC_FULL §3.10; see DESIGN.md for
    /// why this is derived rather than configured separately).
    pub watch_root: PathBuf,
}

impl Config {
    /// Load configuration for the user-level daemon. One daemon instance
    /// serves all configured hosts/directories for a user.
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = state_dir()?;
        Ok(Self::from_state_dir(state_dir))
    }

    fn from_state_dir(state_dir: PathBuf) -> Self {
        Self {
            socket_path: std::env::var("AFD_SOCKET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| state_dir.join("afd.sock")),
            lock_path: state_dir.join("afd.pid"),
            version_path: state_dir.join("afd.version"),
            log_path: state_dir.join("afd.log"),
            wal_path: state_dir.join("wal").join("events.wal"),
            snapshot_path: state_dir.join("snapshot.json"),
            counter_path: state_dir.join("unique_counter"),
            host_config_path: state_dir.join("host_config.toml"),
            dir_config_path: state_dir.join("dir_config.toml"),
            route_file_path: state_dir.join("route_config.toml"),
            tuning_path: state_dir.join("afd.toml"),
            spool_root: state_dir.join("spool"),
            watch_root: state_dir.join("watch"),
            state_dir,
        }
    }
}

/// Runtime tuning knobs, loaded from the versioned `afd.toml` document at
/// [`Config::tuning_path`]. Absent entirely, sensible defaults apply
/// (matching `Tuning::default()`), so a fresh install needs no file.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub retry_base_interval_ms: u64,
    pub retry_max_interval_ms: u64,
    pub resend_limit: u32,
    pub max_copied_files: u32,
    pub transfer_timeout_ms: u64,
    pub watch_scan_interval_ms: u64,
    pub checkpoint_interval_secs: u64,
    pub flush_interval_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            retry_base_interval_ms: 30_000,
            retry_max_interval_ms: 30 * 60 * 1000,
            resend_limit: 10_000,
            max_copied_files: 100,
            transfer_timeout_ms: 60_000,
            watch_scan_interval_ms: 5_000,
            checkpoint_interval_secs: 60,
            flush_interval_ms: 10,
        }
    }
}

impl Tuning {
    pub fn retry_base_interval(&self) -> Duration {
        Duration::from_millis(self.retry_base_interval_ms)
    }

    pub fn retry_max_interval(&self) -> Duration {
        Duration::from_millis(self.retry_max_interval_ms)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_millis(self.transfer_timeout_ms)
    }

    pub fn checkpoint_interval(&self) -> Duration {
        Duration::from_secs(self.checkpoint_interval_secs)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Load from `path`, falling back to defaults if the file doesn't
    /// exist at all (a fresh state directory is not a misconfiguration).
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        #[derive(Deserialize)]
        struct TuningFile {
            version: u32,
            #[serde(flatten)]
            tuning: Tuning,
        }

        let parsed: TuningFile = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        if parsed.version != SUPPORTED_TUNING_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: parsed.version,
                expected: SUPPORTED_TUNING_VERSION,
            });
        }

        Ok(parsed.tuning)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

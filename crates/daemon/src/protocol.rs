// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-surface request/response vocabulary (spec §6.6): every action
//! an operator can take from the CLI, addressed by host/directory alias
//! rather than the numeric ids HST/DST key on internally.

use afd_core::host::DebugMode;
use serde::{Deserialize, Serialize};

pub use crate::protocol_wire::{
    decode, encode, read_message, read_request, write_message, write_response, ProtocolError,
    DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE,
};

/// Everything the CLI can send the daemon. Every mutating variant writes
/// a DEBUG-level system log line and an EVENT log record keyed by the
/// relevant entity id (spec §6.6), handled in the listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    Ping,
    Hello {
        version: String,
    },
    Status,
    Shutdown,

    StartQueue {
        host: String,
    },
    StopQueue {
        host: String,
    },
    StartTransfer {
        host: String,
    },
    StopTransfer {
        host: String,
    },
    EnableHost {
        host: String,
    },
    DisableHost {
        host: String,
    },
    EnableDir {
        dir: String,
    },
    DisableDir {
        dir: String,
    },
    SwitchHostToggle {
        host: String,
    },
    SetRealHostname {
        host: String,
        position: u8,
        hostname: String,
    },
    Retry {
        host: String,
    },
    Rescan {
        dir: String,
    },
    SetDebugMode {
        host: String,
        mode: DebugMode,
    },
    SetSimulateSend {
        host: String,
        enabled: bool,
    },

    StartAmg,
    StopAmg,
    ToggleAmg,
    StartFd,
    StopFd,
    ToggleFd,

    ForceFileDirCheck {
        dir: Option<String>,
    },
    RereadLocInterfaceFile,
    ForceArchiveCheck {
        selections: Vec<ResendSelectionWire>,
        #[serde(default)]
        priorities: Vec<JobPriorityWire>,
    },
    ForceSearchOldFiles,

    Query {
        query: Query,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Query {
    ListHosts,
    GetHost { host: String },
    ListDirs,
    GetDir { dir: String },
    ShowExecStatistics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSummary {
    pub host_id: u32,
    pub host_alias: String,
    pub current_hostname: String,
    pub toggle: char,
    pub allowed_transfers: u32,
    pub active_transfers: u32,
    pub total_file_counter: u64,
    pub total_file_size: u64,
    pub error_counter: u32,
    pub max_errors: u32,
    pub status_color: String,
    pub debug: String,
    pub in_config: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirSummary {
    pub dir_id: u32,
    pub dir_alias: String,
    pub host_alias: Option<String>,
    pub next_check_time: u64,
    pub flags: Vec<String>,
}

/// One archived output-log line selected to replay (spec §4.6 step 1):
/// the log file and the byte offset at which the recorded line begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendSelectionWire {
    pub log_path: String,
    pub byte_offset: u64,
}

/// Priority override for one job id in a resend pass. A job id with no
/// entry here defaults to priority 0: the daemon keeps no durable
/// priority history once a job has dispatched, so the "`job_id` →
/// priority lookup" spec §4.6 step 2 describes is operator-supplied here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPriorityWire {
    pub job_id: u32,
    pub priority: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostExecStat {
    pub host_alias: String,
    pub total_file_counter: u64,
    pub total_file_size: u64,
    pub error_counter: u32,
}

/// Everything the daemon can send back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Ok,
    Error { message: String },
    Pong,
    Hello { version: String },
    ShuttingDown,
    Status {
        uptime_secs: u64,
        host_count: usize,
        dir_count: usize,
        pending_jobs: usize,
        amg_enabled: bool,
        fd_enabled: bool,
    },
    Hosts { hosts: Vec<HostSummary> },
    Host { host: Option<HostSummary> },
    Dirs { dirs: Vec<DirSummary> },
    Dir { dir: Option<DirSummary> },
    ExecStatistics { stats: Vec<HostExecStat> },
    ResendReport {
        files_staged: u32,
        limit_reached: bool,
        not_in_archive: Vec<String>,
    },
}

/// Daemon binary + protocol version string the CLI checks against when
/// deciding whether to restart a stale daemon (spec §3.6). Unlike the
/// teacher's `PROTOCOL_VERSION`, this carries no build-hash suffix: this
/// workspace has no `build.rs` minting one (see DESIGN.md).
pub fn protocol_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

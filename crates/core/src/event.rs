// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event log for HST/DST mutation. Every write to the materialized state
//! goes through one of these variants so it can be durably logged to the
//! WAL and replayed on recovery (spec §4.1, §4.2; SPEC_FULL §3.6).

use crate::host::{DebugMode, HostStatusFlags, SpecialFlag};
use crate::directory::DirFlags;
use crate::ids::{DirId, HostId, JobId, UniqueNumber};
use crate::job_message::JobMessage;
use serde::{Deserialize, Serialize};

/// A host entry as read from the authoritative host-config file, prior to
/// reconciliation with the live table (spec §3.1 "Lifecycle").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfigEntry {
    pub host_id: HostId,
    pub host_alias: String,
    pub host_toggle_str: Option<String>,
    pub real_hostname: [String; 2],
    pub protocol: u32,
    pub allowed_transfers: u32,
    pub max_errors: u32,
    pub host_status: HostStatusFlags,
}

/// A directory entry as read from the authoritative directory-config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirConfigEntry {
    pub dir_id: DirId,
    pub dir_alias: String,
    pub host_alias: Option<String>,
}

/// Terminal outcome of one worker's ownership of a job slot (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    Done,
    Error,
    Timeout,
    Cancelled,
}

/// Events that mutate HST, DST, or the FD ready-queue.
///
/// Serializes with `{"type": "domain:action", ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    // -- host config lifecycle (spec §3.1, §4.1) --
    #[serde(rename = "host:config_reloaded")]
    HostConfigReloaded { hosts: Vec<HostConfigEntry> },

    #[serde(rename = "host:flag_set")]
    HostFlagSet {
        host_id: HostId,
        flags: HostStatusFlags,
    },

    #[serde(rename = "host:flag_cleared")]
    HostFlagCleared {
        host_id: HostId,
        flags: HostStatusFlags,
    },

    #[serde(rename = "host:flag_toggled")]
    HostFlagToggled {
        host_id: HostId,
        flags: HostStatusFlags,
    },

    #[serde(rename = "host:special_flag_set")]
    HostSpecialFlagSet { host_id: HostId, flags: SpecialFlag },

    #[serde(rename = "host:special_flag_cleared")]
    HostSpecialFlagCleared { host_id: HostId, flags: SpecialFlag },

    #[serde(rename = "host:debug_mode_set")]
    HostDebugModeSet { host_id: HostId, mode: DebugMode },

    #[serde(rename = "host:toggle_switched")]
    HostToggleSwitched { host_id: HostId },

    #[serde(rename = "host:real_hostname_set")]
    HostRealHostnameSet {
        host_id: HostId,
        position: u8,
        hostname: String,
    },

    #[serde(rename = "host:counters_adjusted")]
    HostCountersAdjusted {
        host_id: HostId,
        delta_files: i64,
        delta_bytes: i64,
    },

    #[serde(rename = "host:error_incremented")]
    HostErrorIncremented { host_id: HostId },

    #[serde(rename = "host:error_reset")]
    HostErrorReset { host_id: HostId },

    #[serde(rename = "host:retry_forced")]
    HostRetryForced { host_id: HostId },

    // -- job slot lifecycle (spec §4.4, §4.5) --
    #[serde(rename = "job_slot:acquired")]
    JobSlotAcquired {
        host_id: HostId,
        slot: usize,
        proc_id: u32,
        no_of_files: u32,
    },

    #[serde(rename = "job_slot:progress")]
    JobSlotProgress {
        host_id: HostId,
        slot: usize,
        bytes_send: u64,
        no_of_files_done: u32,
    },

    #[serde(rename = "job_slot:retired")]
    JobSlotRetired {
        host_id: HostId,
        slot: usize,
        outcome: JobOutcome,
    },

    // -- directory config / DST (spec §3.2, §4.2) --
    #[serde(rename = "dir:config_reloaded")]
    DirConfigReloaded { dirs: Vec<DirConfigEntry> },

    #[serde(rename = "dir:flag_set")]
    DirFlagSet { dir_id: DirId, flags: DirFlags },

    #[serde(rename = "dir:flag_cleared")]
    DirFlagCleared { dir_id: DirId, flags: DirFlags },

    #[serde(rename = "dir:rescan_forced")]
    DirRescanForced { dir_id: DirId, now_ms: u64 },

    /// The in-process directory watcher (SPEC_FULL §3.10) completed a poll
    /// and is scheduling its next one; unlike `DirRescanForced`, the new
    /// deadline may move forward.
    #[serde(rename = "dir:next_scan_scheduled")]
    DirNextScanScheduled {
        dir_id: DirId,
        next_check_time_ms: u64,
    },

    // -- ready queue / bus (spec §3.3, §4.4, §4.6) --
    #[serde(rename = "job:enqueued")]
    JobEnqueued {
        message: JobMessage,
        staging_dir: String,
        created_at_ms: u64,
    },

    #[serde(rename = "job:dispatched")]
    JobDispatched {
        job_id: JobId,
        host_id: HostId,
        slot: usize,
    },

    /// Queued jobs evicted without ever reaching a worker: a directory or
    /// host was disabled out from under them (spec §4.2 "ENABLE/DISABLE
    /// additionally emit `DELETE_RETRIEVES_FROM_DIR`", §4.4 fd_delete
    /// opcodes). `host_id` is the backlog the purged jobs had been counted
    /// against at enqueue time, if any route was configured for them.
    #[serde(rename = "job:purged")]
    JobsPurged {
        job_ids: Vec<JobId>,
        host_id: Option<HostId>,
        delta_files: i64,
        delta_bytes: i64,
    },

    #[serde(rename = "resend:staged")]
    ResendStaged {
        job_id: JobId,
        host_id: HostId,
        unique_number: UniqueNumber,
        files_to_send: u32,
        file_size_to_send: u64,
    },

    #[serde(rename = "resend:rolled_back")]
    ResendRolledBack {
        job_id: JobId,
        host_id: HostId,
        files_to_send: u32,
        file_size_to_send: u64,
    },
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

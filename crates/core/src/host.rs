// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host slot: the element type of the Host Status Table (HST).

use crate::ids::HostId;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Upper bound on `allowed_transfers`, matching `MAX_NO_PARALLEL_JOBS`.
pub const MAX_NO_PARALLEL_JOBS: u32 = 64;

bitflags! {
    /// `host_status` bitset (spec §3.1).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct HostStatusFlags: u32 {
        const PAUSE_QUEUE            = 1 << 0;
        const STOP_TRANSFER          = 1 << 1;
        const AUTO_PAUSE_QUEUE       = 1 << 2;
        const DANGER_PAUSE_QUEUE     = 1 << 3;
        const ERROR_QUEUE_SET        = 1 << 4;
        const HOST_ERROR_OFFLINE     = 1 << 5;
        const HOST_ERROR_OFFLINE_T   = 1 << 6;
        const HOST_ERROR_OFFLINE_STATIC = 1 << 7;
        const HOST_ERROR_ACKNOWLEDGED   = 1 << 8;
        const HOST_ERROR_ACKNOWLEDGED_T = 1 << 9;
        const HOST_WARN_TIME_REACHED    = 1 << 10;
        const SIMULATE_SEND_MODE        = 1 << 11;
        const DO_NOT_DELETE_DATA        = 1 << 12;
        const ERROR_HOSTS_IN_GROUP      = 1 << 13;
        const WARN_HOSTS_IN_GROUP       = 1 << 14;
    }
}

bitflags! {
    /// `special_flag` bitset (spec §3.1).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SpecialFlag: u32 {
        const HOST_DISABLED    = 1 << 0;
        const HOST_IN_DIR_CONFIG = 1 << 1;
    }
}

/// Host debug/trace level (spec §3.1, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugMode {
    #[default]
    Normal,
    Debug,
    Trace,
    FullTrace,
}

/// A/B failover selector for `real_hostname[]` (spec §3.1, Glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Toggle {
    #[default]
    A,
    B,
}

impl Toggle {
    pub fn index(self) -> usize {
        match self {
            Toggle::A => 0,
            Toggle::B => 1,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Toggle::A => Toggle::B,
            Toggle::B => Toggle::A,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Toggle::A => 'A',
            Toggle::B => 'B',
        }
    }
}

/// Connection status of a single job slot (spec §3.1, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectStatus {
    #[default]
    NotConnected,
    Connecting,
    Connected,
    Transferring,
    Closing,
}

/// One per-parallel-transfer slot inside a [`HostSlot`] (spec §3.1).
///
/// Invariant (I2): `proc_id != 0` iff the slot is owned by a live worker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSlot {
    /// Process/task identifier of the owning worker, or 0 if free.
    pub proc_id: u32,
    pub connect_status: ConnectStatus,
    pub no_of_files: u32,
    pub no_of_files_done: u32,
    pub bytes_send: u64,
    /// Epoch milliseconds of the slot's last counter write.
    pub last_activity_ms: u64,
}

impl JobSlot {
    pub fn is_owned(&self) -> bool {
        self.proc_id != 0
    }

    pub fn retire(&mut self) {
        self.proc_id = 0;
        self.connect_status = ConnectStatus::NotConnected;
        self.no_of_files = 0;
        self.no_of_files_done = 0;
        self.bytes_send = 0;
    }
}

/// Derived, human-visible status color (spec §4.1). Computed, never stored:
/// two readers observing the same slot fields always agree (property P6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusColor {
    Neutral,
    Default,
    Offline,
    Acknowledged,
    NotWorking,
    Warning,
    Active,
    Normal,
}

/// An element of the Host Status Table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSlot {
    pub host_id: HostId,
    pub host_alias: String,
    /// Two-character A/B switch string shown to operators (e.g. "AB"), if
    /// the host supports failover at all.
    pub host_toggle_str: Option<String>,
    /// Primary (`[0]`) and secondary/failover (`[1]`) hostnames.
    pub real_hostname: [String; 2],
    /// Protocol mask; top bits carry direction (send/receive).
    pub protocol: u32,
    pub allowed_transfers: u32,
    pub job_slots: Vec<JobSlot>,
    pub total_file_counter: u64,
    pub total_file_size: u64,
    pub error_counter: u32,
    pub max_errors: u32,
    pub host_status: HostStatusFlags,
    pub special_flag: SpecialFlag,
    pub debug: DebugMode,
    pub toggle_pos: u32,
    pub host_toggle: Toggle,
    /// Absolute epoch-ms time window during which transient offline/ack
    /// states apply; 0 on either side means open on that side.
    pub start_event_handle: u64,
    pub end_event_handle: u64,
    /// True while this host is present in the authoritative host-config
    /// file. Cleared (not removed) when an entry vanishes on reload.
    pub in_config: bool,
    /// True when this host participates in a group with an error/warn
    /// mirror (drives `ERROR_HOSTS_IN_GROUP` / `WARN_HOSTS_IN_GROUP`).
    pub group_error: bool,
    pub group_warn: bool,
}

pub const PROTOCOL_DIRECTION_RECEIVE: u32 = 1 << 31;

impl HostSlot {
    pub fn new(host_id: HostId, host_alias: impl Into<String>, allowed_transfers: u32) -> Self {
        let allowed_transfers = allowed_transfers.min(MAX_NO_PARALLEL_JOBS);
        Self {
            host_id,
            host_alias: host_alias.into(),
            host_toggle_str: None,
            real_hostname: [String::new(), String::new()],
            protocol: 0,
            allowed_transfers,
            job_slots: vec![JobSlot::default(); allowed_transfers as usize],
            total_file_counter: 0,
            total_file_size: 0,
            error_counter: 0,
            max_errors: 10,
            host_status: HostStatusFlags::empty(),
            special_flag: SpecialFlag::empty(),
            debug: DebugMode::Normal,
            toggle_pos: 0,
            host_toggle: Toggle::A,
            start_event_handle: 0,
            end_event_handle: 0,
            in_config: true,
            group_error: false,
            group_warn: false,
        }
    }

    pub fn active_transfers(&self) -> u32 {
        self.job_slots.iter().filter(|s| s.is_owned()).count() as u32
    }

    pub fn free_slots(&self) -> u32 {
        if self.blocks_new_workers() {
            return 0;
        }
        self.allowed_transfers.saturating_sub(self.active_transfers())
    }

    /// True while no new worker may be spawned for this host (invariant I3,
    /// property P3).
    pub fn blocks_new_workers(&self) -> bool {
        self.special_flag.contains(SpecialFlag::HOST_DISABLED)
            || self.host_status.contains(HostStatusFlags::PAUSE_QUEUE)
            || self.host_status.contains(HostStatusFlags::STOP_TRANSFER)
            || self.host_status.contains(HostStatusFlags::AUTO_PAUSE_QUEUE)
    }

    pub fn current_hostname(&self) -> &str {
        &self.real_hostname[self.host_toggle.index()]
    }

    /// Switch the A/B toggle (spec §8 scenario 6). Only `real_hostname[]`
    /// selection is affected; `host_id` remains the stable identity.
    pub fn switch_toggle(&mut self) {
        self.host_toggle = self.host_toggle.flipped();
        self.toggle_pos = self.host_toggle.index() as u32;
    }

    fn event_window_active(&self, now_ms: u64) -> bool {
        let after_start = self.start_event_handle == 0 || self.start_event_handle <= now_ms;
        let before_end = self.end_event_handle == 0 || now_ms <= self.end_event_handle;
        after_start && before_end
    }

    /// Derive the visible status color per the ordered cascade in spec §4.1.
    /// First match wins.
    pub fn status_color(&self, now_ms: u64) -> StatusColor {
        if self.special_flag.contains(SpecialFlag::HOST_DISABLED) {
            return StatusColor::Neutral;
        }
        if !self.in_config {
            return StatusColor::Default;
        }

        let color = if self.error_counter >= self.max_errors && self.max_errors > 0 {
            self.classify_error_state(now_ms, StatusColor::NotWorking)
        } else if self.host_status.contains(HostStatusFlags::HOST_WARN_TIME_REACHED) {
            self.classify_error_state(now_ms, StatusColor::Warning)
        } else if self.active_transfers() > 0 {
            StatusColor::Active
        } else {
            StatusColor::Normal
        };

        // Group override (last step of the cascade).
        if self.group_error {
            StatusColor::NotWorking
        } else if self.group_warn {
            StatusColor::Warning
        } else {
            color
        }
    }

    fn classify_error_state(&self, now_ms: u64, default: StatusColor) -> StatusColor {
        let offline_static = self
            .host_status
            .contains(HostStatusFlags::HOST_ERROR_OFFLINE_STATIC);
        let offline_t = self.host_status.contains(HostStatusFlags::HOST_ERROR_OFFLINE_T)
            && self.event_window_active(now_ms);
        if self
            .host_status
            .contains(HostStatusFlags::HOST_ERROR_OFFLINE)
            && (offline_static || offline_t || self.start_event_handle == 0 && self.end_event_handle == 0)
        {
            return StatusColor::Offline;
        }

        let ack_t = self
            .host_status
            .contains(HostStatusFlags::HOST_ERROR_ACKNOWLEDGED_T)
            && self.event_window_active(now_ms);
        if self
            .host_status
            .contains(HostStatusFlags::HOST_ERROR_ACKNOWLEDGED)
            && (ack_t || self.start_event_handle == 0 && self.end_event_handle == 0)
        {
            return StatusColor::Acknowledged;
        }

        default
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory slot: the element type of the Directory Status Table (DST).

use crate::ids::DirId;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// DST flag bits (spec §3.2).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct DirFlags: u32 {
        const DIR_DISABLED            = 1 << 0;
        const DIR_STOPPED             = 1 << 1;
        const DIR_ALL_DISABLED_MIRROR = 1 << 2;
        const DIR_WARN                = 1 << 3;
        const DIR_ERROR               = 1 << 4;
    }
}

/// An element of the Directory Status Table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorySlot {
    pub dir_id: DirId,
    pub dir_alias: String,
    /// Host alias associated with this directory for the pull (retrieve)
    /// case; `None` for push-only directories.
    pub host_alias: Option<String>,
    pub no_of_time_entries: u32,
    /// Epoch milliseconds of the next scheduled scan.
    pub next_check_time: u64,
    pub flags: DirFlags,
    pub start_event_handle: u64,
    pub end_event_handle: u64,
}

impl DirectorySlot {
    pub fn new(dir_id: DirId, dir_alias: impl Into<String>) -> Self {
        Self {
            dir_id,
            dir_alias: dir_alias.into(),
            host_alias: None,
            no_of_time_entries: 0,
            next_check_time: 0,
            flags: DirFlags::empty(),
            start_event_handle: 0,
            end_event_handle: 0,
        }
    }

    pub fn is_pull_directory(&self) -> bool {
        self.host_alias.is_some()
    }

    /// Advances the next-scan deadline forward (SPEC_FULL §3.10), used by
    /// the in-process directory watcher after completing a poll. Unlike
    /// [`Self::force_rescan`], which only ever pulls the deadline earlier,
    /// this unconditionally sets it, including into the future.
    pub fn schedule_next_scan(&mut self, next_check_time_ms: u64) {
        self.next_check_time = next_check_time_ms;
    }

    /// Spec §3.2 invariant: rescanning is only permitted when
    /// `next_check_time > now` in scheduled mode. Forcing a rescan
    /// overwrites `next_check_time := now` and reports whether a
    /// `FORCE_REMOTE_DIR_CHECK` bus message must be emitted (iff a pull
    /// association exists).
    ///
    /// Returns `None` if the directory was already due (no-op: the
    /// scheduled scan will happen on its own).
    pub fn force_rescan(&mut self, now_ms: u64) -> Option<bool> {
        if self.next_check_time <= now_ms {
            return None;
        }
        self.next_check_time = now_ms;
        Some(self.is_pull_directory())
    }
}

#[cfg(test)]
#[path = "directory_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::host::{ConnectStatus, HostSlot, JobSlot};
use crate::{DirId, DirectorySlot, HostId, JobId, JobMessage, Originator, UniqueNumber};

pub fn host_slot(host_id: u32, alias: &str, allowed_transfers: u32) -> HostSlot {
    HostSlot::new(HostId::new(host_id), alias, allowed_transfers)
}

/// A host slot with `n` of its job slots marked busy, for exercising
/// `free_slots`/`active_transfers`/`status_color`.
pub fn host_slot_with_active_transfers(host_id: u32, alias: &str, allowed_transfers: u32, busy: u32) -> HostSlot {
    let mut host = host_slot(host_id, alias, allowed_transfers);
    for slot in host.job_slots.iter_mut().take(busy as usize) {
        slot.proc_id = 1;
        slot.connect_status = ConnectStatus::Transferring;
    }
    host
}

pub fn dir_slot(dir_id: u32, alias: &str) -> DirectorySlot {
    DirectorySlot::new(DirId::new(dir_id), alias)
}

pub fn pull_dir_slot(dir_id: u32, alias: &str, host_alias: &str) -> DirectorySlot {
    let mut dir = dir_slot(dir_id, alias);
    dir.host_alias = Some(host_alias.to_string());
    dir
}

pub fn job_message(job_id: u32, unique_number: u32, dir_no: u32, file_size: u64) -> JobMessage {
    JobMessage {
        creation_time: 1_000_000,
        file_size,
        job_id: JobId::new(job_id),
        split_job_counter: 0,
        files_to_send: 1,
        unique_number: UniqueNumber::new(unique_number),
        dir_no: DirId::new(dir_no),
        priority: b'5',
        originator: Originator::Amg,
    }
}

pub fn owned_job_slot(proc_id: u32) -> JobSlot {
    JobSlot {
        proc_id,
        connect_status: ConnectStatus::Transferring,
        no_of_files: 1,
        no_of_files_done: 0,
        bytes_send: 0,
        last_activity_ms: 0,
    }
}

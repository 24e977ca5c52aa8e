// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay: the Host Status Table, Directory
//! Status Table, and the set of jobs the dispatcher has accepted but not
//! yet handed to a worker.

use afd_core::event::{DirConfigEntry, HostConfigEntry, JobOutcome};
use afd_core::host::{HostStatusFlags, SpecialFlag};
use afd_core::{DirId, DirectorySlot, Event, HostId, HostSlot, JobId, JobMessage};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A job the dispatcher has accepted (staged) but not yet assigned to a
/// worker slot (spec §4.4). Removed once `Event::JobDispatched` fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingJob {
    pub message: JobMessage,
    pub staging_dir: String,
    pub queued_at_ms: u64,
}

/// The full in-memory picture of HST + DST + the dispatcher's ready queue,
/// rebuilt from a snapshot plus WAL replay on every restart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializedState {
    pub hosts: IndexMap<HostId, HostSlot>,
    pub dirs: IndexMap<DirId, DirectorySlot>,
    pub pending_jobs: IndexMap<JobId, PendingJob>,
    /// High-water mark for the Unique Counter Service (spec §4.7); advanced
    /// independently of individual job events so a crash never reissues a
    /// number already handed out.
    pub next_unique_number: u32,
}

impl MaterializedState {
    pub fn host(&self, id: HostId) -> Option<&HostSlot> {
        self.hosts.get(&id)
    }

    pub fn host_mut(&mut self, id: HostId) -> Option<&mut HostSlot> {
        self.hosts.get_mut(&id)
    }

    pub fn dir(&self, id: DirId) -> Option<&DirectorySlot> {
        self.dirs.get(&id)
    }

    pub fn dir_mut(&mut self, id: DirId) -> Option<&mut DirectorySlot> {
        self.dirs.get_mut(&id)
    }

    /// Reconcile the host table against a freshly-loaded config file (spec
    /// §3.1 "Lifecycle", §4.1). Existing runtime fields (job slots,
    /// counters, error state) survive for hosts that remain in config;
    /// hosts no longer present are marked `in_config = false` rather than
    /// removed, so their last-known status stays visible to operators.
    fn reload_hosts(&mut self, entries: &[HostConfigEntry]) {
        let configured: std::collections::HashSet<HostId> =
            entries.iter().map(|e| e.host_id).collect();

        for entry in entries {
            let slot = self
                .hosts
                .entry(entry.host_id)
                .or_insert_with(|| HostSlot::new(entry.host_id, &entry.host_alias, entry.allowed_transfers));
            slot.host_alias = entry.host_alias.clone();
            slot.real_hostname = entry.real_hostname.clone();
            slot.protocol = entry.protocol;
            slot.allowed_transfers = entry.allowed_transfers;
            slot.max_errors = entry.max_errors;
            slot.host_status = entry.host_status;
            slot.host_toggle_str = entry.host_toggle_str.clone();
            slot.job_slots.resize_with(entry.allowed_transfers as usize, Default::default);
            slot.in_config = true;
        }

        for (id, slot) in self.hosts.iter_mut() {
            if !configured.contains(id) {
                slot.in_config = false;
            }
        }
    }

    /// Reconcile DST against a freshly-loaded directory config (spec §3.2,
    /// §4.2). Entries no longer present keep their scheduling state; only
    /// `dir_alias`/`host_alias` are refreshed for survivors.
    fn reload_dirs(&mut self, entries: &[DirConfigEntry]) {
        for entry in entries {
            let slot = self
                .dirs
                .entry(entry.dir_id)
                .or_insert_with(|| DirectorySlot::new(entry.dir_id, &entry.dir_alias));
            slot.dir_alias = entry.dir_alias.clone();
            slot.host_alias = entry.host_alias.clone();
        }
    }

    /// Apply one durable event to the materialized state. Called both when
    /// an event is first produced and when replaying the WAL during
    /// recovery, so it must be a pure function of `(state, event)`.
    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::HostConfigReloaded { hosts } => self.reload_hosts(hosts),

            Event::HostFlagSet { host_id, flags } => {
                if let Some(host) = self.host_mut(*host_id) {
                    host.host_status.insert(*flags);
                }
            }
            Event::HostFlagCleared { host_id, flags } => {
                if let Some(host) = self.host_mut(*host_id) {
                    host.host_status.remove(*flags);
                }
            }
            Event::HostFlagToggled { host_id, flags } => {
                if let Some(host) = self.host_mut(*host_id) {
                    host.host_status.toggle(*flags);
                }
            }
            Event::HostSpecialFlagSet { host_id, flags } => {
                if let Some(host) = self.host_mut(*host_id) {
                    host.special_flag.insert(*flags);
                }
            }
            Event::HostSpecialFlagCleared { host_id, flags } => {
                if let Some(host) = self.host_mut(*host_id) {
                    host.special_flag.remove(*flags);
                }
            }
            Event::HostDebugModeSet { host_id, mode } => {
                if let Some(host) = self.host_mut(*host_id) {
                    host.debug = *mode;
                }
            }
            Event::HostToggleSwitched { host_id } => {
                if let Some(host) = self.host_mut(*host_id) {
                    host.switch_toggle();
                }
            }
            Event::HostRealHostnameSet {
                host_id,
                position,
                hostname,
            } => {
                if let Some(host) = self.host_mut(*host_id) {
                    if let Some(slot) = host.real_hostname.get_mut(*position as usize) {
                        *slot = hostname.clone();
                    }
                }
            }
            Event::HostCountersAdjusted {
                host_id,
                delta_files,
                delta_bytes,
            } => {
                if let Some(host) = self.host_mut(*host_id) {
                    host.total_file_counter = host
                        .total_file_counter
                        .saturating_add_signed(*delta_files);
                    host.total_file_size = host.total_file_size.saturating_add_signed(*delta_bytes);
                }
            }
            Event::HostErrorIncremented { host_id } => {
                if let Some(host) = self.host_mut(*host_id) {
                    host.error_counter += 1;
                }
            }
            Event::HostErrorReset { host_id } => {
                if let Some(host) = self.host_mut(*host_id) {
                    host.error_counter = 0;
                    host.host_status.remove(
                        HostStatusFlags::HOST_ERROR_OFFLINE
                            | HostStatusFlags::HOST_ERROR_OFFLINE_T
                            | HostStatusFlags::HOST_ERROR_OFFLINE_STATIC
                            | HostStatusFlags::HOST_ERROR_ACKNOWLEDGED
                            | HostStatusFlags::HOST_ERROR_ACKNOWLEDGED_T
                            | HostStatusFlags::ERROR_QUEUE_SET,
                    );
                }
            }
            Event::HostRetryForced { host_id } => {
                if let Some(host) = self.host_mut(*host_id) {
                    host.start_event_handle = 0;
                    host.end_event_handle = 0;
                }
            }

            Event::JobSlotAcquired {
                host_id,
                slot,
                proc_id,
                no_of_files,
            } => {
                if let Some(host) = self.host_mut(*host_id) {
                    if let Some(job_slot) = host.job_slots.get_mut(*slot) {
                        job_slot.proc_id = *proc_id;
                        job_slot.connect_status = afd_core::ConnectStatus::Connecting;
                        job_slot.no_of_files = *no_of_files;
                        job_slot.no_of_files_done = 0;
                        job_slot.bytes_send = 0;
                    }
                }
            }
            Event::JobSlotProgress {
                host_id,
                slot,
                bytes_send,
                no_of_files_done,
            } => {
                if let Some(host) = self.host_mut(*host_id) {
                    if let Some(job_slot) = host.job_slots.get_mut(*slot) {
                        job_slot.connect_status = afd_core::ConnectStatus::Transferring;
                        job_slot.bytes_send = *bytes_send;
                        job_slot.no_of_files_done = *no_of_files_done;
                    }
                }
            }
            Event::JobSlotRetired {
                host_id,
                slot,
                outcome,
            } => {
                if let Some(host) = self.host_mut(*host_id) {
                    if matches!(outcome, JobOutcome::Error | JobOutcome::Timeout) {
                        host.error_counter += 1;
                    }
                    if let Some(job_slot) = host.job_slots.get_mut(*slot) {
                        job_slot.retire();
                    }
                }
            }

            Event::DirConfigReloaded { dirs } => self.reload_dirs(dirs),
            Event::DirFlagSet { dir_id, flags } => {
                if let Some(dir) = self.dir_mut(*dir_id) {
                    dir.flags.insert(*flags);
                }
            }
            Event::DirFlagCleared { dir_id, flags } => {
                if let Some(dir) = self.dir_mut(*dir_id) {
                    dir.flags.remove(*flags);
                }
            }
            Event::DirRescanForced { dir_id, now_ms } => {
                if let Some(dir) = self.dir_mut(*dir_id) {
                    dir.force_rescan(*now_ms);
                }
            }
            Event::DirNextScanScheduled {
                dir_id,
                next_check_time_ms,
            } => {
                if let Some(dir) = self.dir_mut(*dir_id) {
                    dir.schedule_next_scan(*next_check_time_ms);
                }
            }

            Event::JobEnqueued {
                message,
                staging_dir,
                created_at_ms,
            } => {
                self.pending_jobs.insert(
                    message.job_id,
                    PendingJob {
                        message: message.clone(),
                        staging_dir: staging_dir.clone(),
                        queued_at_ms: *created_at_ms,
                    },
                );
            }
            Event::JobDispatched { job_id, .. } => {
                self.pending_jobs.shift_remove(job_id);
            }
            Event::JobsPurged {
                job_ids,
                host_id,
                delta_files,
                delta_bytes,
            } => {
                for job_id in job_ids {
                    self.pending_jobs.shift_remove(job_id);
                }
                if let Some(host_id) = host_id {
                    if let Some(host) = self.host_mut(*host_id) {
                        host.total_file_counter =
                            host.total_file_counter.saturating_add_signed(*delta_files);
                        host.total_file_size = host.total_file_size.saturating_add_signed(*delta_bytes);
                    }
                }
            }

            // Resend bookkeeping is an audit trail for the archive pipeline
            // (spec §4.6); it has no corresponding HST/DST field to mutate.
            Event::ResendStaged { .. } | Event::ResendRolledBack { .. } => {}
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;

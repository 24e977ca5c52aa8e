// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The File Distributor's scheduling loop (spec §4.4): for each host with
//! free slots and queued jobs, pop the next eligible job (ordered by
//! priority, then creation time, then split-job counter) and acquire a
//! job slot for it. Pure with respect to [`MaterializedState`] — it reads
//! the table and returns decisions; applying them (and spawning the
//! worker task) is the caller's job.

use crate::route::RouteTable;
use afd_core::event::JobOutcome;
use afd_core::{Event, HostId, HostStatusFlags, JobId, JobMessage};
use afd_storage::{MaterializedState, PendingJob};

/// One job handed to a newly-acquired job slot.
#[derive(Debug, Clone)]
pub struct DispatchDecision {
    pub job_id: JobId,
    pub host_id: HostId,
    pub slot: usize,
    pub proc_id: u32,
    pub message: JobMessage,
    pub staging_dir: String,
}

impl DispatchDecision {
    pub fn events(&self) -> Vec<Event> {
        vec![
            Event::JobDispatched {
                job_id: self.job_id,
                host_id: self.host_id,
                slot: self.slot,
            },
            Event::JobSlotAcquired {
                host_id: self.host_id,
                slot: self.slot,
                proc_id: self.proc_id,
                no_of_files: self.message.files_to_send,
            },
        ]
    }
}

/// Orders a host's ready-queue candidates per spec §4.4 step 3: priority
/// ascending (lower value = scheduled first), then creation time, then
/// split-job counter, both ties broken for determinism.
fn ordering_key(job: &PendingJob) -> (u8, u64, u32) {
    (
        job.message.priority,
        job.message.creation_time,
        job.message.split_job_counter,
    )
}

/// Computes this iteration's dispatch decisions. `next_proc_id` stands in
/// for the real worker process/task id allocator; each acquired slot
/// consumes one value and the counter is advanced in place so repeated
/// calls never reuse an id.
pub fn dispatch_ready_jobs(
    state: &MaterializedState,
    routes: &RouteTable,
    next_proc_id: &mut u32,
) -> Vec<DispatchDecision> {
    let mut by_host: std::collections::HashMap<HostId, Vec<&PendingJob>> =
        std::collections::HashMap::new();
    for job in state.pending_jobs.values() {
        if let Some(host_id) = routes.host_for(job.message.dir_no) {
            by_host.entry(host_id).or_default().push(job);
        }
    }

    let mut decisions = Vec::new();

    for (host_id, mut jobs) in by_host {
        let Some(host) = state.host(host_id) else {
            continue;
        };
        jobs.sort_by_key(|j| ordering_key(j));

        let free = host.free_slots() as usize;
        if free == 0 {
            continue;
        }

        let mut free_slot_indices = host
            .job_slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.is_owned())
            .map(|(i, _)| i);

        for job in jobs.into_iter().take(free) {
            let Some(slot) = free_slot_indices.next() else {
                break;
            };
            let proc_id = *next_proc_id;
            *next_proc_id += 1;

            tracing::debug!(
                job_id = job.message.job_id.get(),
                host_id = host_id.get(),
                slot,
                proc_id,
                "dispatching job to job slot"
            );
            decisions.push(DispatchDecision {
                job_id: job.message.job_id,
                host_id,
                slot,
                proc_id,
                message: job.message,
                staging_dir: job.staging_dir.clone(),
            });
        }
    }

    decisions
}

/// Events produced when a worker terminates and its job slot is reaped
/// (spec §4.4 step 4): the slot is released and, if the host's error
/// threshold was just crossed, `AUTO_PAUSE_QUEUE` is set so the scheduler
/// stops handing it new work until an operator (or a successful retry)
/// clears it.
pub fn reap_worker(
    state: &MaterializedState,
    host_id: HostId,
    slot: usize,
    outcome: JobOutcome,
) -> Vec<Event> {
    let mut events = vec![Event::JobSlotRetired {
        host_id,
        slot,
        outcome,
    }];

    if matches!(outcome, JobOutcome::Error | JobOutcome::Timeout) {
        if let Some(host) = state.host(host_id) {
            let would_exceed = host.error_counter + 1 >= host.max_errors && host.max_errors > 0;
            if would_exceed && !host.host_status.contains(HostStatusFlags::AUTO_PAUSE_QUEUE) {
                tracing::warn!(
                    host_id = host_id.get(),
                    error_counter = host.error_counter + 1,
                    max_errors = host.max_errors,
                    "host crossed its error threshold, setting AUTO_PAUSE_QUEUE"
                );
                events.push(Event::HostFlagSet {
                    host_id,
                    flags: HostStatusFlags::AUTO_PAUSE_QUEUE,
                });
            }
        }
    }

    events
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use afd_core::event::{DirConfigEntry, HostConfigEntry};
use afd_core::job_message::Originator;
use afd_core::{DirId, UniqueNumber};

fn host_entry(id: u32, allowed_transfers: u32) -> HostConfigEntry {
    HostConfigEntry {
        host_id: HostId::new(id),
        host_alias: format!("host{id}"),
        host_toggle_str: None,
        real_hostname: [format!("mirror{id}.example"), String::new()],
        protocol: 0,
        allowed_transfers,
        max_errors: 3,
        host_status: HostStatusFlags::empty(),
    }
}

fn job(job_id: u32, dir_no: u32, priority: u8, creation_time: u64) -> JobMessage {
    JobMessage {
        creation_time,
        file_size: 100,
        job_id: JobId::new(job_id),
        split_job_counter: 0,
        files_to_send: 1,
        unique_number: UniqueNumber::new(job_id),
        dir_no: DirId::new(dir_no),
        priority,
        originator: Originator::Amg,
    }
}

fn state_with_one_host_and_jobs(allowed_transfers: u32, jobs: Vec<JobMessage>) -> MaterializedState {
    let mut state = MaterializedState::default();
    state.apply_event(&Event::HostConfigReloaded {
        hosts: vec![host_entry(1, allowed_transfers)],
    });
    for message in jobs {
        state.apply_event(&Event::JobEnqueued {
            message,
            staging_dir: format!("stage-{}", message.job_id.get()),
            created_at_ms: 0,
        });
    }
    state
}

fn routes_to_host_one() -> RouteTable {
    let mut routes = RouteTable::new();
    routes.insert(DirId::new(9), HostId::new(1));
    routes
}

#[test]
fn dispatches_up_to_free_slot_count_in_priority_order() {
    let state = state_with_one_host_and_jobs(
        2,
        vec![job(1, 9, 5, 100), job(2, 9, 1, 50), job(3, 9, 5, 10)],
    );
    let routes = routes_to_host_one();
    let mut next_proc_id = 100u32;

    let decisions = dispatch_ready_jobs(&state, &routes, &mut next_proc_id);

    assert_eq!(decisions.len(), 2);
    // priority 1 (job 2) goes first; among the priority-5 jobs, earlier
    // creation_time (job 3) wins the remaining slot.
    let ids: Vec<u32> = decisions.iter().map(|d| d.job_id.get()).collect();
    assert_eq!(ids, vec![2, 3]);
    assert_eq!(next_proc_id, 102);
}

#[test]
fn unrouted_jobs_are_never_dispatched() {
    let state = state_with_one_host_and_jobs(2, vec![job(1, 404, 1, 0)]);
    let routes = routes_to_host_one();
    let mut next_proc_id = 1;

    let decisions = dispatch_ready_jobs(&state, &routes, &mut next_proc_id);
    assert!(decisions.is_empty());
}

#[test]
fn blocked_host_yields_no_decisions() {
    let mut state = state_with_one_host_and_jobs(2, vec![job(1, 9, 1, 0)]);
    state.apply_event(&Event::HostFlagSet {
        host_id: HostId::new(1),
        flags: HostStatusFlags::PAUSE_QUEUE,
    });
    let routes = routes_to_host_one();
    let mut next_proc_id = 1;

    assert!(dispatch_ready_jobs(&state, &routes, &mut next_proc_id).is_empty());
}

#[test]
fn decisions_never_exceed_available_job_slots() {
    let state = state_with_one_host_and_jobs(
        1,
        vec![job(1, 9, 1, 0), job(2, 9, 1, 1), job(3, 9, 1, 2)],
    );
    let routes = routes_to_host_one();
    let mut next_proc_id = 1;

    let decisions = dispatch_ready_jobs(&state, &routes, &mut next_proc_id);
    assert_eq!(decisions.len(), 1);
}

#[test]
fn reap_worker_sets_auto_pause_once_error_threshold_crossed() {
    let mut state = MaterializedState::default();
    state.apply_event(&Event::HostConfigReloaded {
        hosts: vec![host_entry(1, 2)],
    });
    // max_errors = 3; two prior errors already recorded.
    state.apply_event(&Event::HostErrorIncremented {
        host_id: HostId::new(1),
    });
    state.apply_event(&Event::HostErrorIncremented {
        host_id: HostId::new(1),
    });

    let events = reap_worker(&state, HostId::new(1), 0, JobOutcome::Error);
    assert!(matches!(events[0], Event::JobSlotRetired { outcome: JobOutcome::Error, .. }));
    assert!(events.iter().any(|e| matches!(
        e,
        Event::HostFlagSet {
            flags,
            ..
        } if flags.contains(HostStatusFlags::AUTO_PAUSE_QUEUE)
    )));
}

#[test]
fn reap_worker_on_done_never_sets_auto_pause() {
    let mut state = MaterializedState::default();
    state.apply_event(&Event::HostConfigReloaded {
        hosts: vec![host_entry(1, 2)],
    });

    let events = reap_worker(&state, HostId::new(1), 0, JobOutcome::Done);
    assert_eq!(events.len(), 1);
}

#[test]
fn dispatch_decision_events_carries_slot_and_proc_id() {
    let decision = DispatchDecision {
        job_id: JobId::new(1),
        host_id: HostId::new(2),
        slot: 0,
        proc_id: 77,
        message: job(1, 9, 1, 0),
        staging_dir: "stage".into(),
    };

    let events = decision.events();
    assert!(matches!(
        events[0],
        Event::JobDispatched { job_id, host_id, slot: 0 }
            if job_id == JobId::new(1) && host_id == HostId::new(2)
    ));
    assert!(matches!(
        events[1],
        Event::JobSlotAcquired { proc_id: 77, .. }
    ));
}

// Silence dead_code lint on DirConfigEntry import kept for readability
// parity with other test modules in this crate.
#[allow(dead_code)]
fn _unused(_: DirConfigEntry) {}

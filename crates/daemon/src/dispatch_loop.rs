// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ties the pure decision logic in `afd-engine` to durable state and
//! actual transfer execution: one tick polls watched directories for new
//! work, dispatches ready jobs to free job slots, and reaps workers that
//! have finished (spec §4.4-§4.5, SPEC_FULL §3.10).

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use afd_core::clock::{Clock, SystemClock};
use afd_core::event::JobOutcome;
use afd_core::host::HostStatusFlags;
use afd_core::{Event, HostId};
use afd_engine::{dispatch_ready_jobs, reap_worker};
use afd_worker::{list_staged_files, run_worker, LocAdapter, ProtocolAdapter, SimulateAdapter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::lifecycle::DaemonState;

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn emit_all(daemon: &DaemonState, events: Vec<Event>) {
    for event in events {
        if let Err(e) = daemon.event_bus.send(event.clone()) {
            warn!(error = %e, "failed to append event to WAL");
            continue;
        }
        daemon.state.lock().apply_event(&event);
    }
}

/// One pass of the directory watcher: polls every push directory whose
/// deadline has elapsed, stages new jobs, and reschedules the next poll.
pub fn run_watch_tick(daemon: &DaemonState) {
    if !daemon.toggles.amg_enabled.load(Ordering::SeqCst) {
        return;
    }

    let now = now_ms();
    let due: Vec<_> = {
        let state = daemon.state.lock();
        let watcher = daemon.watcher.lock();
        watcher.due_targets(state.dirs.values(), now).into_iter().cloned().collect()
    };

    for target in due {
        let job_id = afd_core::JobId::new(daemon.next_job_id.fetch_add(1, Ordering::SeqCst));
        let events = {
            let watcher = daemon.watcher.lock();
            let routes = daemon.routes.lock();
            watcher.poll(&target, &routes, &daemon.config.spool_root, daemon.counter.as_ref(), job_id, 0, now)
        };
        match events {
            Ok(events) => emit_all(daemon, events),
            Err(e) => warn!(dir_id = target.dir_id.get(), error = %e, "failed to poll watched directory"),
        }
    }
}

/// Hosts whose backoff timer just elapsed become eligible for dispatch
/// again: clear `AUTO_PAUSE_QUEUE` so the scheduler considers them.
pub fn run_retry_tick(daemon: &DaemonState) {
    let fired = daemon.retry.lock().fired(std::time::Instant::now());
    for host_id in fired {
        debug!(host_id = host_id.get(), "retry backoff elapsed, re-enabling host");
        emit_all(
            daemon,
            vec![Event::HostFlagCleared { host_id, flags: HostStatusFlags::AUTO_PAUSE_QUEUE }],
        );
    }
}

/// One scheduling pass: dispatch every ready job a host has a free slot
/// for, spawning a worker task per acquired slot.
pub fn run_dispatch_tick(daemon: &Arc<DaemonState>) {
    let decisions = {
        let state = daemon.state.lock();
        let routes = daemon.routes.lock();
        let mut next_proc_id_guard = daemon.next_proc_id.load(Ordering::SeqCst);
        let decisions = dispatch_ready_jobs(&state, &routes, &mut next_proc_id_guard);
        daemon.next_proc_id.store(next_proc_id_guard, Ordering::SeqCst);
        decisions
    };

    for decision in decisions {
        emit_all(daemon, decision.events());
        spawn_worker(Arc::clone(daemon), decision);
    }
}

fn spawn_worker(daemon: Arc<DaemonState>, decision: afd_engine::DispatchDecision) {
    tokio::spawn(async move {
        let host_id = decision.host_id;
        let slot = decision.slot;
        let proc_id = decision.proc_id;

        let (hostname, simulate, transfer_timeout) = {
            let state = daemon.state.lock();
            match state.host(host_id) {
                Some(host) => (
                    host.current_hostname().to_string(),
                    host.host_status.contains(HostStatusFlags::SIMULATE_SEND_MODE),
                    daemon.tuning.transfer_timeout(),
                ),
                None => {
                    warn!(host_id = host_id.get(), "dispatched job references unknown host");
                    return;
                }
            }
        };

        let staging_dir = daemon.config.spool_root.join(&decision.staging_dir);
        let files = match list_staged_files(&staging_dir) {
            Ok(files) => files,
            Err(e) => {
                warn!(staging_dir = %staging_dir.display(), error = %e, "failed to list staged files");
                Vec::new()
            }
        };

        let cancellation = CancellationToken::new();
        daemon.cancellations.lock().insert((host_id, slot), cancellation.clone());

        let result = tokio::task::spawn_blocking(move || {
            let clock = SystemClock;
            let mut adapter: Box<dyn ProtocolAdapter> = if simulate {
                Box::new(SimulateAdapter::new())
            } else {
                Box::new(LocAdapter::new())
            };
            run_worker(
                adapter.as_mut(),
                &clock,
                &hostname,
                slot as u32,
                proc_id,
                &files,
                transfer_timeout,
                &cancellation,
                |_files_done, _bytes_sent| {},
            )
        })
        .await;

        daemon.cancellations.lock().remove(&(host_id, slot));

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "worker task panicked");
                return;
            }
        };

        for line in &result.trace_lines {
            debug!(target: "afd_daemon::trace", "{line}");
        }
        if let Some(error) = &result.error {
            warn!(host_id = host_id.get(), slot, error = %error, "worker finished with an error");
        }

        reap(&daemon, host_id, slot, result.outcome, result.files_done, result.bytes_sent);
    });
}

fn reap(
    daemon: &DaemonState,
    host_id: HostId,
    slot: usize,
    outcome: JobOutcome,
    files_done: u32,
    bytes_sent: u64,
) {
    let mut events = {
        let state = daemon.state.lock();
        reap_worker(&state, host_id, slot, outcome)
    };
    if matches!(outcome, JobOutcome::Done) {
        events.push(Event::HostCountersAdjusted {
            host_id,
            delta_files: -(files_done as i64),
            delta_bytes: -(bytes_sent as i64),
        });
    }
    emit_all(daemon, events);

    if matches!(outcome, JobOutcome::Error | JobOutcome::Timeout) {
        daemon.retry.lock().schedule_failure(
            host_id,
            std::time::Instant::now(),
            daemon.tuning.retry_base_interval(),
            daemon.tuning.retry_max_interval(),
        );
    }
}

/// Drives the watch/retry/dispatch ticks on their configured intervals
/// until `shutdown` fires.
pub async fn run(daemon: Arc<DaemonState>, mut shutdown: tokio::sync::watch::Receiver<bool>) {
    let mut watch_interval = tokio::time::interval(Duration::from_millis(daemon.tuning.watch_scan_interval_ms));
    let mut dispatch_interval = tokio::time::interval(Duration::from_millis(250));

    loop {
        tokio::select! {
            _ = watch_interval.tick() => run_watch_tick(&daemon),
            _ = dispatch_interval.tick() => {
                run_retry_tick(&daemon);
                run_dispatch_tick(&daemon);
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatch_loop_tests.rs"]
mod tests;

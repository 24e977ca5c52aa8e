// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix socket accept loop: parses control-surface requests (spec §6.6)
//! and applies them against the running [`DaemonState`]. Every mutating
//! request is logged at DEBUG and durably recorded as an `Event` before
//! the response goes out, so a crash between "applied" and "acked" can
//! never leave an operator action unaccounted for on restart.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use afd_core::host::{DebugMode, HostStatusFlags, SpecialFlag};
use afd_core::directory::DirFlags;
use afd_core::{Event, JobId};
use afd_engine::ResendSelection;
use afd_transport::{FdDeleteFrame, FdDeleteOpcode};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, warn};

use crate::lifecycle::DaemonState;
use crate::protocol::{
    DirSummary, HostExecStat, HostSummary, JobPriorityWire, Query, Request, Response,
    ProtocolError, ResendSelectionWire,
};
use crate::protocol_wire::{read_request, write_response, DEFAULT_TIMEOUT};

/// Accepts connections on `listener` until `shutdown` fires, handling each
/// one on its own task. The daemon's control surface is low-traffic and
/// strictly request/response, so one task per connection is plenty.
pub async fn run(
    listener: UnixListener,
    daemon: std::sync::Arc<DaemonState>,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let daemon = std::sync::Arc::clone(&daemon);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, &daemon).await {
                                warn!(error = %e, "control connection ended with an error");
                            }
                        });
                    }
                    Err(e) => error!(error = %e, "failed to accept control connection"),
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

async fn handle_connection(
    mut stream: UnixStream,
    daemon: &DaemonState,
) -> Result<(), ProtocolError> {
    loop {
        let request: Request = match read_request(&mut stream, DEFAULT_TIMEOUT).await {
            Ok(req) => req,
            Err(ProtocolError::ConnectionClosed) => return Ok(()),
            Err(e) => return Err(e),
        };

        let response = dispatch(daemon, request);
        write_response(&mut stream, &response, DEFAULT_TIMEOUT).await?;

        if matches!(response, Response::ShuttingDown) {
            return Ok(());
        }
    }
}

fn find_host_id(daemon: &DaemonState, alias: &str) -> Option<afd_core::HostId> {
    daemon
        .state
        .lock()
        .hosts
        .values()
        .find(|h| h.host_alias == alias)
        .map(|h| h.host_id)
}

fn find_dir_id(daemon: &DaemonState, alias: &str) -> Option<afd_core::DirId> {
    daemon
        .state
        .lock()
        .dirs
        .values()
        .find(|d| d.dir_alias == alias)
        .map(|d| d.dir_id)
}

/// Records `event` to the WAL and immediately applies it, so the next
/// request on this or any other connection sees the effect right away
/// rather than waiting for the dispatch loop's next tick.
fn emit(daemon: &DaemonState, event: Event) -> Response {
    if let Err(e) = daemon.event_bus.send(event.clone()) {
        error!(error = %e, "failed to append event to WAL");
        return Response::Error { message: e.to_string() };
    }
    daemon.state.lock().apply_event(&event);
    Response::Ok
}

fn unknown_host(alias: &str) -> Response {
    Response::Error { message: format!("unknown host alias: {alias}") }
}

fn unknown_dir(alias: &str) -> Response {
    Response::Error { message: format!("unknown directory alias: {alias}") }
}

fn dispatch(daemon: &DaemonState, request: Request) -> Response {
    match request {
        Request::Ping => Response::Pong,
        Request::Hello { version } => {
            debug!(client_version = %version, "hello from client");
            Response::Hello { version: crate::protocol::protocol_version().to_string() }
        }
        Request::Status => status(daemon),
        Request::Shutdown => {
            debug!("shutdown requested over control socket");
            Response::ShuttingDown
        }

        Request::StartQueue { host } => with_host(daemon, &host, |host_id| {
            debug!(host = %host, "start queue");
            emit(daemon, Event::HostFlagCleared { host_id, flags: HostStatusFlags::PAUSE_QUEUE })
        }),
        Request::StopQueue { host } => with_host(daemon, &host, |host_id| {
            debug!(host = %host, "stop queue");
            emit(daemon, Event::HostFlagSet { host_id, flags: HostStatusFlags::PAUSE_QUEUE })
        }),
        Request::StartTransfer { host } => with_host(daemon, &host, |host_id| {
            debug!(host = %host, "start transfer");
            emit(daemon, Event::HostFlagCleared { host_id, flags: HostStatusFlags::STOP_TRANSFER })
        }),
        Request::StopTransfer { host } => with_host(daemon, &host, |host_id| {
            debug!(host = %host, "stop transfer");
            let response = emit(daemon, Event::HostFlagSet { host_id, flags: HostStatusFlags::STOP_TRANSFER });
            let cancelled = cancel_workers_for_host(daemon, host_id);
            if cancelled > 0 {
                debug!(host = %host, cancelled, "cancelled in-flight workers for STOP_TRANSFER");
            }
            response
        }),
        Request::EnableHost { host } => with_host(daemon, &host, |host_id| {
            debug!(host = %host, "enable host");
            emit(daemon, Event::HostSpecialFlagCleared { host_id, flags: SpecialFlag::HOST_DISABLED })
        }),
        Request::DisableHost { host } => with_host(daemon, &host, |host_id| {
            debug!(host = %host, "disable host");
            let response = emit(daemon, Event::HostSpecialFlagSet { host_id, flags: SpecialFlag::HOST_DISABLED });
            if !matches!(response, Response::Ok) {
                return response;
            }
            match purge_jobs_for_host(daemon, host_id) {
                Some(event) => {
                    let frame = FdDeleteFrame { opcode: FdDeleteOpcode::DeleteAllJobsFromHost, alias: host.clone() };
                    debug!(host = %host, frame = ?frame.encode(), "evicting queued jobs for disabled host");
                    emit(daemon, event)
                }
                None => Response::Ok,
            }
        }),
        Request::EnableDir { dir } => with_dir(daemon, &dir, |dir_id| {
            debug!(dir = %dir, "enable directory");
            emit(daemon, Event::DirFlagCleared { dir_id, flags: DirFlags::DIR_DISABLED })
        }),
        Request::DisableDir { dir } => with_dir(daemon, &dir, |dir_id| {
            debug!(dir = %dir, "disable directory");
            let response = emit(daemon, Event::DirFlagSet { dir_id, flags: DirFlags::DIR_DISABLED });
            if !matches!(response, Response::Ok) {
                return response;
            }
            match purge_jobs_for_dir(daemon, dir_id) {
                Some(event) => {
                    let frame = FdDeleteFrame { opcode: FdDeleteOpcode::DeleteRetrievesFromDir, alias: dir.clone() };
                    debug!(dir = %dir, frame = ?frame.encode(), "evicting queued jobs for disabled directory");
                    emit(daemon, event)
                }
                None => Response::Ok,
            }
        }),
        Request::SwitchHostToggle { host } => with_host(daemon, &host, |host_id| {
            debug!(host = %host, "switch A/B toggle");
            emit(daemon, Event::HostToggleSwitched { host_id })
        }),
        Request::SetRealHostname { host, position, hostname } => {
            with_host(daemon, &host, |host_id| {
                debug!(host = %host, position, hostname = %hostname, "set real hostname");
                emit(daemon, Event::HostRealHostnameSet { host_id, position, hostname: hostname.clone() })
            })
        }
        Request::Retry { host } => with_host(daemon, &host, |host_id| {
            debug!(host = %host, "force retry");
            daemon.retry.lock().force_retry(host_id);
            emit(daemon, Event::HostRetryForced { host_id })
        }),
        Request::Rescan { dir } => with_dir(daemon, &dir, |dir_id| {
            debug!(dir = %dir, "force rescan");
            let now_ms = now_ms();
            let should_emit = daemon
                .state
                .lock()
                .dir_mut(dir_id)
                .and_then(|d| d.force_rescan(now_ms))
                .unwrap_or(false);
            if should_emit {
                emit(daemon, Event::DirRescanForced { dir_id, now_ms })
            } else {
                Response::Ok
            }
        }),
        Request::SetDebugMode { host, mode } => with_host(daemon, &host, |host_id| {
            debug!(host = %host, mode = ?mode, "set debug mode");
            emit(daemon, Event::HostDebugModeSet { host_id, mode })
        }),
        Request::SetSimulateSend { host, enabled } => with_host(daemon, &host, |host_id| {
            debug!(host = %host, enabled, "set simulate-send mode");
            if enabled {
                emit(daemon, Event::HostFlagSet { host_id, flags: HostStatusFlags::SIMULATE_SEND_MODE })
            } else {
                emit(daemon, Event::HostFlagCleared { host_id, flags: HostStatusFlags::SIMULATE_SEND_MODE })
            }
        }),

        Request::StartAmg => {
            debug!("start AMG");
            daemon.toggles.amg_enabled.store(true, Ordering::SeqCst);
            Response::Ok
        }
        Request::StopAmg => {
            debug!("stop AMG");
            daemon.toggles.amg_enabled.store(false, Ordering::SeqCst);
            Response::Ok
        }
        Request::ToggleAmg => {
            let new_value = !daemon.toggles.amg_enabled.load(Ordering::SeqCst);
            debug!(enabled = new_value, "toggle AMG");
            daemon.toggles.amg_enabled.store(new_value, Ordering::SeqCst);
            Response::Ok
        }
        Request::StartFd => {
            debug!("start FD");
            daemon.toggles.fd_enabled.store(true, Ordering::SeqCst);
            Response::Ok
        }
        Request::StopFd => {
            debug!("stop FD");
            daemon.toggles.fd_enabled.store(false, Ordering::SeqCst);
            Response::Ok
        }
        Request::ToggleFd => {
            let new_value = !daemon.toggles.fd_enabled.load(Ordering::SeqCst);
            debug!(enabled = new_value, "toggle FD");
            daemon.toggles.fd_enabled.store(new_value, Ordering::SeqCst);
            Response::Ok
        }

        Request::ForceFileDirCheck { dir } => {
            debug!(dir = ?dir, "force file-dir check");
            let now_ms = now_ms();
            let mut state = daemon.state.lock();
            match dir {
                Some(alias) => match state.dirs.values_mut().find(|d| d.dir_alias == alias) {
                    Some(slot) => {
                        slot.force_rescan(now_ms);
                        Response::Ok
                    }
                    None => unknown_dir(&alias),
                },
                None => {
                    for slot in state.dirs.values_mut() {
                        slot.force_rescan(now_ms);
                    }
                    Response::Ok
                }
            }
        }
        Request::RereadLocInterfaceFile => {
            debug!("reread LOC interface file");
            match afd_engine::RouteTable::load(&daemon.config.route_file_path) {
                Ok(table) => {
                    *daemon.routes.lock() = table;
                    Response::Ok
                }
                Err(e) => Response::Error { message: e.to_string() },
            }
        }
        Request::ForceArchiveCheck { selections, priorities } => {
            debug!(count = selections.len(), "force archive check (resend pass)");
            force_archive_check(daemon, &selections, &priorities)
        }
        Request::ForceSearchOldFiles => {
            debug!("force search for old files");
            Response::Ok
        }

        Request::Query { query } => handle_query(daemon, query),
    }
}

/// Queued jobs staged from `dir_id` that never reached a worker: evicted
/// from the ready queue, with any backlog they had established against
/// their routed host undone in the same event (spec §4.2, §4.4).
fn purge_jobs_for_dir(daemon: &DaemonState, dir_id: afd_core::DirId) -> Option<Event> {
    let state = daemon.state.lock();
    let mut job_ids = Vec::new();
    let mut delta_files = 0i64;
    let mut delta_bytes = 0i64;
    for job in state.pending_jobs.values() {
        if job.message.dir_no == dir_id {
            job_ids.push(job.message.job_id);
            delta_files += job.message.files_to_send as i64;
            delta_bytes += job.message.file_size as i64;
        }
    }
    if job_ids.is_empty() {
        return None;
    }
    let host_id = daemon.routes.lock().host_for(dir_id);
    Some(Event::JobsPurged {
        job_ids,
        host_id,
        delta_files: -delta_files,
        delta_bytes: -delta_bytes,
    })
}

/// Every queued job routed to `host_id`, regardless of source directory,
/// evicted the same way `purge_jobs_for_dir` evicts one directory's.
fn purge_jobs_for_host(daemon: &DaemonState, host_id: afd_core::HostId) -> Option<Event> {
    let state = daemon.state.lock();
    let routes = daemon.routes.lock();
    let mut job_ids = Vec::new();
    let mut delta_files = 0i64;
    let mut delta_bytes = 0i64;
    for job in state.pending_jobs.values() {
        if routes.host_for(job.message.dir_no) == Some(host_id) {
            job_ids.push(job.message.job_id);
            delta_files += job.message.files_to_send as i64;
            delta_bytes += job.message.file_size as i64;
        }
    }
    if job_ids.is_empty() {
        return None;
    }
    Some(Event::JobsPurged {
        job_ids,
        host_id: Some(host_id),
        delta_files: -delta_files,
        delta_bytes: -delta_bytes,
    })
}

/// Cancels every worker currently holding a job slot for `host_id`
/// (spec §4.4 "STOP_TRANSFER cancellation"). Returns how many were
/// signalled; the workers themselves tear down and reap on their own next
/// poll of the cancellation token.
fn cancel_workers_for_host(daemon: &DaemonState, host_id: afd_core::HostId) -> usize {
    let mut cancelled = 0;
    for (&(owner, _slot), token) in daemon.cancellations.lock().iter() {
        if owner == host_id {
            token.cancel();
            cancelled += 1;
        }
    }
    cancelled
}

/// Applies every event in `events` in order, stopping at the first WAL
/// write failure. Mirrors `dispatch_loop::emit_all`'s apply step but
/// reports success/failure so a caller can decide whether to roll back
/// (spec §4.6 "Failure semantics").
fn try_emit_all(daemon: &DaemonState, events: Vec<Event>) -> bool {
    for event in events {
        if let Err(e) = daemon.event_bus.send(event.clone()) {
            error!(error = %e, "failed to append event to WAL");
            return false;
        }
        daemon.state.lock().apply_event(&event);
    }
    true
}

/// Runs the resend/archive pipeline (spec §4.6) over `selections` and
/// publishes every resulting batch, rolling back a batch's HST counter
/// bump if its publish step fails partway through.
fn force_archive_check(
    daemon: &DaemonState,
    selections: &[ResendSelectionWire],
    priorities: &[JobPriorityWire],
) -> Response {
    let selections: Vec<ResendSelection> = selections
        .iter()
        .map(|s| ResendSelection { log_path: PathBuf::from(&s.log_path), byte_offset: s.byte_offset })
        .collect();

    let host_for_job = match afd_engine::resolve_hosts(&selections, |alias| find_host_id(daemon, alias)) {
        Ok(map) => map,
        Err(e) => return Response::Error { message: e.to_string() },
    };

    let mut job_priorities: HashMap<JobId, u8> =
        host_for_job.keys().map(|job_id| (*job_id, 0)).collect();
    for p in priorities {
        job_priorities.insert(JobId::new(p.job_id), p.priority);
    }

    let now = now_ms();
    let summary = afd_engine::run_resend(
        &selections,
        &job_priorities,
        |job_id| host_for_job.get(&job_id).copied(),
        &daemon.config.spool_root,
        daemon.counter.as_ref(),
        daemon.tuning.max_copied_files,
        daemon.tuning.resend_limit,
        now,
    );
    let summary = match summary {
        Ok(s) => s,
        Err(e) => return Response::Error { message: e.to_string() },
    };

    let mut not_in_archive = Vec::new();
    for batch in &summary.batches {
        if try_emit_all(daemon, batch.publish_events(now)) {
            not_in_archive.extend(batch.not_in_archive.iter().cloned());
        } else {
            try_emit_all(daemon, batch.rollback_events());
            return Response::Error { message: "failed to publish resend batch".to_string() };
        }
    }

    Response::ResendReport {
        files_staged: summary.total_staged,
        limit_reached: summary.limit_reached,
        not_in_archive,
    }
}

fn with_host(daemon: &DaemonState, alias: &str, f: impl FnOnce(afd_core::HostId) -> Response) -> Response {
    match find_host_id(daemon, alias) {
        Some(host_id) => f(host_id),
        None => unknown_host(alias),
    }
}

fn with_dir(daemon: &DaemonState, alias: &str, f: impl FnOnce(afd_core::DirId) -> Response) -> Response {
    match find_dir_id(daemon, alias) {
        Some(dir_id) => f(dir_id),
        None => unknown_dir(alias),
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn status(daemon: &DaemonState) -> Response {
    let state = daemon.state.lock();
    Response::Status {
        uptime_secs: daemon.start_time.elapsed().as_secs(),
        host_count: state.hosts.len(),
        dir_count: state.dirs.len(),
        pending_jobs: state.pending_jobs.len(),
        amg_enabled: daemon.toggles.amg_enabled.load(Ordering::SeqCst),
        fd_enabled: daemon.toggles.fd_enabled.load(Ordering::SeqCst),
    }
}

fn host_summary(host: &afd_core::HostSlot, now_ms: u64) -> HostSummary {
    HostSummary {
        host_id: host.host_id.get(),
        host_alias: host.host_alias.clone(),
        current_hostname: host.current_hostname().to_string(),
        toggle: host.host_toggle.as_char(),
        allowed_transfers: host.allowed_transfers,
        active_transfers: host.active_transfers(),
        total_file_counter: host.total_file_counter,
        total_file_size: host.total_file_size,
        error_counter: host.error_counter,
        max_errors: host.max_errors,
        status_color: format!("{:?}", host.status_color(now_ms)),
        debug: debug_label(host.debug),
        in_config: host.in_config,
    }
}

fn debug_label(mode: DebugMode) -> String {
    match mode {
        DebugMode::Normal => "normal",
        DebugMode::Debug => "debug",
        DebugMode::Trace => "trace",
        DebugMode::FullTrace => "full_trace",
    }
    .to_string()
}

fn dir_summary(dir: &afd_core::DirectorySlot) -> DirSummary {
    let mut flags = Vec::new();
    if dir.flags.contains(DirFlags::DIR_DISABLED) {
        flags.push("disabled".to_string());
    }
    if dir.flags.contains(DirFlags::DIR_STOPPED) {
        flags.push("stopped".to_string());
    }
    if dir.flags.contains(DirFlags::DIR_ALL_DISABLED_MIRROR) {
        flags.push("all_disabled_mirror".to_string());
    }
    if dir.flags.contains(DirFlags::DIR_WARN) {
        flags.push("warn".to_string());
    }
    if dir.flags.contains(DirFlags::DIR_ERROR) {
        flags.push("error".to_string());
    }
    DirSummary {
        dir_id: dir.dir_id.get(),
        dir_alias: dir.dir_alias.clone(),
        host_alias: dir.host_alias.clone(),
        next_check_time: dir.next_check_time,
        flags,
    }
}

fn handle_query(daemon: &DaemonState, query: Query) -> Response {
    let now_ms = now_ms();
    let state = daemon.state.lock();
    match query {
        Query::ListHosts => Response::Hosts {
            hosts: state.hosts.values().map(|h| host_summary(h, now_ms)).collect(),
        },
        Query::GetHost { host } => Response::Host {
            host: state.hosts.values().find(|h| h.host_alias == host).map(|h| host_summary(h, now_ms)),
        },
        Query::ListDirs => Response::Dirs {
            dirs: state.dirs.values().map(dir_summary).collect(),
        },
        Query::GetDir { dir } => Response::Dir {
            dir: state.dirs.values().find(|d| d.dir_alias == dir).map(dir_summary),
        },
        Query::ShowExecStatistics => Response::ExecStatistics {
            stats: state
                .hosts
                .values()
                .map(|h| HostExecStat {
                    host_alias: h.host_alias.clone(),
                    total_file_counter: h.total_file_counter,
                    total_file_size: h.total_file_size,
                    error_counter: h.error_counter,
                })
                .collect(),
        },
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;

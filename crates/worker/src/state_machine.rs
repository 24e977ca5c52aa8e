// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The protocol worker state machine (spec §4.5): `INIT -> CONNECTING ->
//! CONNECTED -> TRANSFERRING(file_i) -> CLOSING -> DONE | ERROR | TIMEOUT |
//! CANCELLED`. Each worker owns one job slot for its lifetime and drives a
//! [`ProtocolAdapter`] instance; cancellation (the `SIGINT`-from-FD
//! contract) is a [`CancellationToken`] checked between discrete steps
//! rather than mid-transfer, matching the file-boundary granularity at
//! which the original reports progress.

use crate::protocol::ProtocolAdapter;
use crate::trace::{format_trace_line, TraceSign};
use afd_core::clock::Clock;
use afd_core::event::JobOutcome;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One file this job must transfer: its local path and the name to give it
/// on the remote end.
#[derive(Debug, Clone)]
pub struct TransferFile {
    pub local_path: PathBuf,
    pub remote_name: String,
}

/// Final disposition of one worker's ownership of a job slot.
#[derive(Debug, Clone)]
pub struct WorkerResult {
    pub outcome: JobOutcome,
    pub files_done: u32,
    pub bytes_sent: u64,
    /// Framed per spec §4.5; emitted to the trace stream by the caller.
    pub trace_lines: Vec<String>,
    pub error: Option<String>,
}

impl WorkerResult {
    fn terminal(outcome: JobOutcome, files_done: u32, bytes_sent: u64) -> Self {
        Self {
            outcome,
            files_done,
            bytes_sent,
            trace_lines: Vec::new(),
            error: None,
        }
    }
}

/// Runs one job to completion against `adapter`, reporting per-file
/// progress through `on_progress(files_done, cumulative_bytes_sent)`.
///
/// Not `async`: the worker's host task is expected to run this on a
/// blocking thread (`tokio::task::spawn_blocking`) since [`ProtocolAdapter`]
/// is a synchronous trait; `cancellation` and `transfer_timeout` are
/// polled between steps rather than awaited.
#[allow(clippy::too_many_arguments)]
pub fn run_worker(
    adapter: &mut dyn ProtocolAdapter,
    clock: &impl Clock,
    hostname: &str,
    job_slot_index: u32,
    proc_id: u32,
    files: &[TransferFile],
    transfer_timeout: Duration,
    cancellation: &CancellationToken,
    mut on_progress: impl FnMut(u32, u64),
) -> WorkerResult {
    let started = clock.now();
    let mut trace_lines = Vec::new();
    let mut trace = |sign: TraceSign, message: String| {
        trace_lines.push(format_trace_line(
            clock,
            sign,
            hostname,
            job_slot_index,
            &message,
            proc_id as u64,
            file!(),
            line!(),
        ));
    };

    let timed_out = || clock.now().duration_since(started) >= transfer_timeout;

    if cancellation.is_cancelled() {
        trace(TraceSign::Minus, "cancelled before connect".to_string());
        let mut result = WorkerResult::terminal(JobOutcome::Cancelled, 0, 0);
        result.trace_lines = trace_lines;
        return result;
    }

    trace(TraceSign::Plus, format!("connecting to {hostname}"));
    if let Err(first_err) = adapter.connect(hostname) {
        // Worker-local retry: one further attempt before surrendering to
        // ERROR, matching "transient errors use worker-local retry before
        // surrendering to ERROR" (auth failures are not retried).
        let retryable = !matches!(first_err, crate::protocol::ProtocolError::Auth(_));
        let final_err = if retryable && !timed_out() && !cancellation.is_cancelled() {
            adapter.connect(hostname).err()
        } else {
            Some(first_err)
        };

        if let Some(err) = final_err {
            trace(TraceSign::Minus, format!("connect failed: {err}"));
            let mut result = WorkerResult::terminal(JobOutcome::Error, 0, 0);
            result.trace_lines = trace_lines;
            result.error = Some(err.to_string());
            return result;
        }
    }
    trace(TraceSign::Plus, "connected".to_string());

    let mut files_done = 0u32;
    let mut bytes_sent = 0u64;
    let mut outcome = JobOutcome::Done;
    let mut error_message = None;

    for file in files {
        if cancellation.is_cancelled() {
            outcome = JobOutcome::Cancelled;
            trace(TraceSign::Minus, "cancelled mid-transfer".to_string());
            break;
        }
        if timed_out() {
            outcome = JobOutcome::Timeout;
            trace(TraceSign::Minus, "transfer timed out".to_string());
            break;
        }

        trace(
            TraceSign::Plus,
            format!("sending {}", file.remote_name),
        );
        let file_base = bytes_sent;
        let send_result = adapter.send_file(&file.local_path, &file.remote_name, &mut |n| {
            bytes_sent = file_base + n;
            on_progress(files_done, bytes_sent);
        });

        match send_result {
            Ok(sent) => {
                bytes_sent = file_base + sent;
                files_done += 1;
                on_progress(files_done, bytes_sent);
                trace(TraceSign::Plus, format!("sent {}", file.remote_name));
            }
            Err(err) => {
                outcome = JobOutcome::Error;
                error_message = Some(err.to_string());
                trace(TraceSign::Minus, format!("send failed: {err}"));
                break;
            }
        }
    }

    trace(TraceSign::Plus, "closing".to_string());
    if let Err(err) = adapter.disconnect() {
        // A disconnect failure never overrides a more specific terminal
        // outcome already decided above, but does surface if the transfer
        // itself otherwise succeeded.
        if matches!(outcome, JobOutcome::Done) {
            outcome = JobOutcome::Error;
            error_message = Some(err.to_string());
        }
        trace(TraceSign::Minus, format!("disconnect failed: {err}"));
    }

    trace(
        match outcome {
            JobOutcome::Done => TraceSign::Plus,
            _ => TraceSign::Minus,
        },
        format!("terminal state {outcome:?}"),
    );

    WorkerResult {
        outcome,
        files_done,
        bytes_sent,
        trace_lines,
        error: error_message,
    }
}

/// Lists the files under a staging directory in a stable order, pairing
/// each with the remote name it keeps (spec: AMG/RAP stage files by their
/// original basename; no remote rename step is modeled here).
pub fn list_staged_files(staging_dir: &Path) -> std::io::Result<Vec<TransferFile>> {
    let mut entries: Vec<_> = std::fs::read_dir(staging_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .collect();
    entries.sort_by_key(|e| e.file_name());

    Ok(entries
        .into_iter()
        .map(|e| {
            let remote_name = e.file_name().to_string_lossy().into_owned();
            TransferFile {
                local_path: e.path(),
                remote_name,
            }
        })
        .collect())
}

#[cfg(test)]
#[path = "state_machine_tests.rs"]
mod tests;

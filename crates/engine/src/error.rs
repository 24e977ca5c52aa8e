// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use afd_core::{DirId, HostId, JobId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("host {0} not found in the host status table")]
    UnknownHost(HostId),
    #[error("job slot {slot} on host {host_id} is already owned (proc_id={proc_id})")]
    SlotAlreadyOwned {
        host_id: HostId,
        slot: usize,
        proc_id: u32,
    },
    #[error("no free job slot available on host {0}")]
    NoFreeSlot(HostId),
}

#[derive(Debug, Error)]
pub enum ResendError {
    #[error("I/O error staging resend output: {0}")]
    Io(#[from] std::io::Error),
    #[error("output log line could not be parsed: {0}")]
    MalformedLogLine(String),
    #[error("unknown job id {0} has no priority mapping")]
    UnknownJobPriority(JobId),
    #[error("resend_limit ({limit}) reached after staging {staged} file(s)")]
    LimitReached { limit: u32, staged: u32 },
    #[error("allocating a unique directory number failed: {0}")]
    Counter(#[from] afd_storage::CounterError),
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("directory {0} has no registered watch target")]
    UnknownDirectory(DirId),
    #[error("I/O error scanning watched directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("allocating a unique directory number failed: {0}")]
    Counter(#[from] afd_storage::CounterError),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-host retry/backoff timers (spec §4.4 "Retry / backoff"): a failure
//! schedules a timer at the host's base interval; repeated failures double
//! it up to a configured maximum. `RETRY_PERM` (via `retry_fd_fifo`)
//! cancels the timer outright and makes the host immediately eligible.

use afd_core::HostId;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct RetryTimer {
    fires_at: Instant,
    current_backoff: Duration,
}

/// Tracks one retry timer per host currently backing off.
#[derive(Debug, Default)]
pub struct RetryScheduler {
    timers: HashMap<HostId, RetryTimer>,
}

impl RetryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules (or re-schedules, with doubled backoff) a host's retry
    /// timer after a worker failure.
    pub fn schedule_failure(
        &mut self,
        host_id: HostId,
        now: Instant,
        base_interval: Duration,
        max_interval: Duration,
    ) {
        let next_backoff = match self.timers.get(&host_id) {
            Some(existing) => (existing.current_backoff * 2).min(max_interval),
            None => base_interval.min(max_interval),
        };
        self.timers.insert(
            host_id,
            RetryTimer {
                fires_at: now + next_backoff,
                current_backoff: next_backoff,
            },
        );
    }

    /// `RETRY_PERM`: cancel the timer, making the host immediately
    /// eligible again.
    pub fn force_retry(&mut self, host_id: HostId) {
        self.timers.remove(&host_id);
    }

    pub fn is_backing_off(&self, host_id: HostId) -> bool {
        self.timers.contains_key(&host_id)
    }

    /// Removes and returns the hosts whose timers have elapsed as of `now`.
    pub fn fired(&mut self, now: Instant) -> Vec<HostId> {
        let fired: Vec<HostId> = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.fires_at <= now)
            .map(|(id, _)| *id)
            .collect();
        for id in &fired {
            self.timers.remove(id);
        }
        fired
    }

    /// The nearest deadline across all hosts currently backing off, used
    /// to bound the scheduler's sleep in its cooperative loop (spec §4.4
    /// step 5).
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().map(|t| t.fires_at).min()
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;

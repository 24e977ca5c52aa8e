// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so timestamps, timeouts, and retry backoff are
//! deterministic in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Source of truth for "now", both as a monotonic `Instant` (used for
/// timers and timeouts) and as epoch milliseconds (used for anything that
/// is persisted or compared across process restarts, e.g. event window
/// handles).
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> Instant;
    fn epoch_ms(&self) -> u64;
}

/// Real wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Deterministic clock for tests. `now()` and `epoch_ms()` only advance
/// when `advance()` is called, so retry/backoff and event-window tests
/// don't race real time.
#[derive(Clone)]
pub struct FakeClock {
    epoch_ms: Arc<AtomicU64>,
    start: Instant,
}

impl FakeClock {
    pub fn new(epoch_ms: u64) -> Self {
        Self {
            epoch_ms: Arc::new(AtomicU64::new(epoch_ms)),
            start: Instant::now(),
        }
    }

    pub fn advance(&self, millis: u64) {
        self.epoch_ms.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, epoch_ms: u64) {
        self.epoch_ms.store(epoch_ms, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(1_700_000_000_000)
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        // Advances the fixed `start` instant by the same delta applied to
        // epoch_ms, keeping the monotonic and wall-clock views in sync.
        let base = 1_700_000_000_000u64;
        let delta = self.epoch_ms.load(Ordering::SeqCst).saturating_sub(base);
        self.start + std::time::Duration::from_millis(delta)
    }

    fn epoch_ms(&self) -> u64 {
        self.epoch_ms.load(Ordering::SeqCst)
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Scheduling and pipeline logic for the Automatic File Distribution
//! engine: the FD dispatch loop and per-host retry/backoff (spec §4.4),
//! the directory-to-host route table it dispatches against, the
//! resend/archive pipeline (spec §4.6), and the directory watcher that
//! feeds new jobs into the ready queue (SPEC_FULL §3.10).

mod error;
mod resend;
mod retry;
mod route;
mod scheduler;
mod watch;

pub use error::{ResendError, SchedulerError, WatchError};
pub use resend::{
    resolve_hosts, run_resend, ResendBatch, ResendSelection, ResendSummary, RESEND_DIR_NO,
};
pub use retry::RetryScheduler;
pub use route::{RouteError, RouteTable};
pub use scheduler::{dispatch_ready_jobs, reap_worker, DispatchDecision};
pub use watch::{DirectoryWatcher, WatchTarget};

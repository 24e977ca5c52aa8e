// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The protocol worker (C5): a polymorphic connect/send-file/disconnect
//! capability set, the state machine that drives it through
//! `INIT -> ... -> DONE | ERROR | TIMEOUT | CANCELLED`, and the
//! trace-stream framing its terminal transitions emit.

#[cfg(any(test, feature = "test-support"))]
mod fake;
mod loc;
mod protocol;
mod simulate;
mod state_machine;
mod trace;

pub use loc::LocAdapter;
pub use protocol::{ProtocolAdapter, ProtocolError};
pub use simulate::SimulateAdapter;
pub use state_machine::{list_staged_files, run_worker, TransferFile, WorkerResult};
pub use trace::{format_trace_line, sanitize, split_lines, TraceSign};

#[cfg(feature = "test-support")]
pub use fake::{FakeAdapter, FakeCall, FakeScript};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! afd-core: shared types for the Automatic File Distribution engine.
//!
//! This crate holds the data model that every other `afd-*` crate builds
//! on: host and directory slot types, the fixed-layout bus messages, id
//! newtypes, the event log used for WAL persistence, and a `Clock`
//! abstraction used throughout for testability.

pub mod clock;
pub mod confirmation;
pub mod directory;
pub mod event;
pub mod host;
pub mod ids;
pub mod job_message;
pub mod olog;
pub mod staging;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use confirmation::{ConfirmationMessage, ConfirmationType};
pub use directory::{DirFlags, DirectorySlot};
pub use event::Event;
pub use host::{
    ConnectStatus, DebugMode, HostSlot, HostStatusFlags, JobSlot, SpecialFlag, StatusColor,
    Toggle,
};
pub use ids::{DirId, HostId, JobId, UniqueNumber};
pub use job_message::{JobMessage, Originator, MAX_BIN_MSG_LENGTH};
pub use staging::StagingDirName;

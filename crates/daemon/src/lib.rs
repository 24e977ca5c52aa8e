// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-side building blocks for the file distribution engine: durable
//! state, the control-socket protocol, and the watch/dispatch loop that
//! drives transfers. The `afdd` binary (`src/main.rs`) wires these together
//! into a running process; `afd-cli` links this crate to talk the same
//! protocol without re-declaring the wire types.

pub mod config;
pub mod dispatch_loop;
pub mod event_bus;
pub mod lifecycle;
pub mod listener;
pub mod protocol;
pub mod protocol_wire;

pub use config::{Config, ConfigError, Tuning};
pub use event_bus::{EventBus, EventReader};
pub use lifecycle::{startup, DaemonState, LifecycleError, RuntimeToggles, StartupResult};
pub use protocol::{
    protocol_version, DirSummary, HostExecStat, HostSummary, JobPriorityWire, Query, Request,
    Response, ResendSelectionWire,
};
pub use protocol_wire::{
    decode, encode, read_message, read_request, write_message, write_response, ProtocolError,
    DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE,
};

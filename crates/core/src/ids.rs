// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Numeric identifier newtypes used across HST, DST, and the bus.

/// Define a newtype ID wrapper around `u32`.
///
/// Unlike the string-keyed ids common elsewhere in this workspace, HST/DST
/// rows and bus messages are keyed by small dense integers so they can be
/// used directly as array/slice indices and packed into fixed-layout wire
/// messages.
macro_rules! define_numeric_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(v: u32) -> Self {
                Self(v)
            }
        }

        impl From<$name> for u32 {
            fn from(v: $name) -> Self {
                v.0
            }
        }
    };
}

define_numeric_id! {
    /// Stable identity of a host slot in HST. Reconciliation on config
    /// reload keys entries by this id, never by `host_alias`.
    pub struct HostId;
}

define_numeric_id! {
    /// Stable identity of a directory slot in DST.
    pub struct DirId;
}

define_numeric_id! {
    /// Identifies one accepted job across the job message, the staging
    /// directory name, and the output log.
    pub struct JobId;
}

define_numeric_id! {
    /// Monotonically increasing disambiguator minted by the unique
    /// counter service (see `afd_storage::counter`).
    pub struct UniqueNumber;
}

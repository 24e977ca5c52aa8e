// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command fifo opcodes (spec §6.1). Each command fifo carries a small,
//! fixed vocabulary of single-byte opcodes; `FD_DELETE_FIFO` additionally
//! carries an opcode-tagged variable-length payload.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OpcodeError {
    #[error("unknown opcode byte {0:#x} for {1}")]
    Unknown(u8, &'static str),
}

macro_rules! byte_opcode {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $byte:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(u8)]
        pub enum $name {
            $($variant = $byte),+
        }

        impl $name {
            pub fn from_byte(b: u8) -> Result<Self, OpcodeError> {
                match b {
                    $($byte => Ok(Self::$variant),)+
                    other => Err(OpcodeError::Unknown(other, stringify!($name))),
                }
            }

            pub fn as_byte(self) -> u8 {
                self as u8
            }
        }
    };
}

byte_opcode! {
    /// `AFD_CMD_FIFO` opcodes.
    AfdCmdOpcode {
        StartFd = 1,
        StopFd = 2,
        StartAmg = 3,
        StopAmg = 4,
    }
}

byte_opcode! {
    /// `FD_CMD_FIFO` opcodes.
    FdCmdOpcode {
        CheckFileDir = 1,
        RereadLocInterfaceFile = 2,
        ForceRemoteDirCheck = 3,
    }
}

byte_opcode! {
    /// `DC_CMD_FIFO` opcodes.
    DcCmdOpcode {
        SrExecStat = 1,
        SearchOldFiles = 2,
    }
}

byte_opcode! {
    /// `AW_CMD_FIFO` opcodes.
    AwCmdOpcode {
        Retry = 1,
    }
}

byte_opcode! {
    /// `FD_DELETE_FIFO` opcodes. Unlike the other command fifos, frames on
    /// this one carry a payload: `{opcode, payload bytes..., 0x00}`.
    FdDeleteOpcode {
        DeleteAllJobsFromHost = 1,
        DeleteRetrievesFromDir = 2,
    }
}

/// A decoded `FD_DELETE_FIFO` frame: opcode plus its NUL-terminated alias
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdDeleteFrame {
    pub opcode: FdDeleteOpcode,
    pub alias: String,
}

impl FdDeleteFrame {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.alias.len() + 2);
        buf.push(self.opcode.as_byte());
        buf.extend_from_slice(self.alias.as_bytes());
        buf.push(0);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, OpcodeError> {
        let (&opcode_byte, rest) = bytes
            .split_first()
            .ok_or(OpcodeError::Unknown(0, "FdDeleteOpcode"))?;
        let opcode = FdDeleteOpcode::from_byte(opcode_byte)?;
        let alias_bytes = rest.strip_suffix(&[0]).unwrap_or(rest);
        let alias = String::from_utf8_lossy(alias_bytes).into_owned();
        Ok(Self { opcode, alias })
    }
}

/// `RETRY_FD_FIFO` payload: a 4-byte native-endianness host slot index.
pub fn encode_retry_fd_slot(slot: u32) -> [u8; 4] {
    slot.to_ne_bytes()
}

pub fn decode_retry_fd_slot(bytes: &[u8; 4]) -> u32 {
    u32::from_ne_bytes(*bytes)
}

/// `DEL_TIME_JOB_FIFO` payload: an alias string plus NUL terminator.
pub fn encode_del_time_job_alias(alias: &str) -> Vec<u8> {
    let mut buf = alias.as_bytes().to_vec();
    buf.push(0);
    buf
}

pub fn decode_del_time_job_alias(bytes: &[u8]) -> String {
    let trimmed = bytes.strip_suffix(&[0]).unwrap_or(bytes);
    String::from_utf8_lossy(trimmed).into_owned()
}

#[cfg(test)]
#[path = "opcodes_tests.rs"]
mod tests;

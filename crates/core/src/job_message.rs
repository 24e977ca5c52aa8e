// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-layout job message, the bus payload produced by AMG (or the
//! resend pipeline) and consumed by the File Distributor (spec §3.3, §6.2).

use crate::ids::{DirId, JobId, UniqueNumber};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tag identifying which producer wrote a job message (spec §6.2,
/// Glossary "Originator byte"). This workspace targets a single-filesystem
/// deployment, so the `fs_id` field the original layout carries for
/// multi-fs builds is not encoded (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Originator {
    /// Produced by the directory watcher (AMG-equivalent, SPEC_FULL §3.10).
    Amg = b'A',
    /// Produced by the resend/archive pipeline (`SHOW_OLOG_NO`).
    ShowOlogResend = b'S',
}

impl Originator {
    fn from_byte(b: u8) -> Result<Self, JobMessageError> {
        match b {
            b'A' => Ok(Originator::Amg),
            b'S' => Ok(Originator::ShowOlogResend),
            other => Err(JobMessageError::UnknownOriginator(other)),
        }
    }
}

/// Fixed total length every job message MUST equal, and MUST fit in a
/// single atomic fifo write (spec §6.2).
pub const MAX_BIN_MSG_LENGTH: usize = 36;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobMessageError {
    #[error("job message length {0} does not equal MAX_BIN_MSG_LENGTH ({MAX_BIN_MSG_LENGTH})")]
    WrongLength(usize),
    #[error("unknown originator byte {0:#x}")]
    UnknownOriginator(u8),
}

/// A job message referencing a staging directory (spec §3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMessage {
    pub creation_time: u64,
    pub file_size: u64,
    pub job_id: JobId,
    pub split_job_counter: u32,
    pub files_to_send: u32,
    pub unique_number: UniqueNumber,
    /// Parsed from the first `/`-delimited hex segment of the staging
    /// directory name (spec §6.5).
    pub dir_no: DirId,
    pub priority: u8,
    pub originator: Originator,
}

impl JobMessage {
    /// Encode to the fixed `MAX_BIN_MSG_LENGTH`-byte wire layout.
    pub fn encode(&self) -> [u8; MAX_BIN_MSG_LENGTH] {
        let mut buf = [0u8; MAX_BIN_MSG_LENGTH];
        let mut offset = 0;

        macro_rules! put {
            ($bytes:expr) => {{
                let b = $bytes;
                buf[offset..offset + b.len()].copy_from_slice(&b);
                offset += b.len();
            }};
        }

        put!(self.creation_time.to_le_bytes());
        put!(self.file_size.to_le_bytes());
        put!(self.job_id.get().to_le_bytes());
        put!(self.split_job_counter.to_le_bytes());
        put!(self.files_to_send.to_le_bytes());
        put!(self.unique_number.get().to_le_bytes());
        put!((self.dir_no.get() as u16).to_le_bytes());
        put!([self.priority]);
        put!([self.originator as u8]);

        debug_assert_eq!(offset, MAX_BIN_MSG_LENGTH);
        buf
    }

    /// Decode from bytes, rejecting anything that does not equal
    /// `MAX_BIN_MSG_LENGTH` (spec B2: "readers reject anything shorter").
    pub fn decode(bytes: &[u8]) -> Result<Self, JobMessageError> {
        if bytes.len() != MAX_BIN_MSG_LENGTH {
            return Err(JobMessageError::WrongLength(bytes.len()));
        }

        let mut offset = 0;
        macro_rules! take {
            ($ty:ty) => {{
                const N: usize = std::mem::size_of::<$ty>();
                let v = <$ty>::from_le_bytes(bytes[offset..offset + N].try_into().unwrap_or([0; N]));
                offset += N;
                v
            }};
        }

        let creation_time = take!(u64);
        let file_size = take!(u64);
        let job_id = take!(u32);
        let split_job_counter = take!(u32);
        let files_to_send = take!(u32);
        let unique_number = take!(u32);
        let dir_no = take!(u16);
        let priority = bytes[offset];
        offset += 1;
        let originator = Originator::from_byte(bytes[offset])?;
        offset += 1;
        debug_assert_eq!(offset, MAX_BIN_MSG_LENGTH);

        Ok(JobMessage {
            creation_time,
            file_size,
            job_id: JobId::new(job_id),
            split_job_counter,
            files_to_send,
            unique_number: UniqueNumber::new(unique_number),
            dir_no: DirId::new(dir_no as u32),
            priority,
            originator,
        })
    }
}

#[cfg(test)]
#[path = "job_message_tests.rs"]
mod tests;

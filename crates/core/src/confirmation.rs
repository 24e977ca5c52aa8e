// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DEMCD delivery-confirmation message layout (spec §4.5, §6.3).
//!
//! Emitted after a protocol worker reaches `DONE` for protocol variants
//! that support delivery confirmation. Offsets are aligned by promoting
//! `file_size` and `job_number` to the wider of the two field widths so a
//! C reader could dereference pointers directly; this workspace keeps
//! that padding for wire compatibility even though Rust consumers decode
//! field-by-field.

use crate::ids::JobId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `hostname` field width, excluding the NUL terminator.
pub const MAX_HOSTNAME_LEN: usize = 64;

/// Width, in bytes, promoted for `file_size` and `job_number` so both
/// occupy the wider of `off_t`/`unsigned int` (here: 8 bytes).
const PADDED_FIELD_WIDTH: usize = 8;

/// Fixed-size prefix length: two padded fields, two u16s, one u8, and the
/// NUL-terminated hostname.
const FIXED_PREFIX_LEN: usize = PADDED_FIELD_WIDTH * 2 + 2 + 2 + 1 + (MAX_HOSTNAME_LEN + 1);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfirmationError {
    #[error("confirmation message shorter than fixed prefix ({FIXED_PREFIX_LEN} bytes)")]
    TooShort,
    #[error("hostname field is not NUL-terminated")]
    UnterminatedHostname,
    #[error("file name field is not NUL-terminated")]
    UnterminatedFileName,
    #[error("hostname exceeds MAX_HOSTNAME_LEN ({MAX_HOSTNAME_LEN})")]
    HostnameTooLong,
    #[error("unknown confirmation type {0}")]
    UnknownType(u8),
}

/// Confirmation outcome reported by protocol variants that support
/// delivery confirmation (e.g. SMTP DSN-style acks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ConfirmationType {
    Normal = 0,
    Timeout = 1,
    Error = 2,
}

impl ConfirmationType {
    fn from_byte(b: u8) -> Result<Self, ConfirmationError> {
        match b {
            0 => Ok(ConfirmationType::Normal),
            1 => Ok(ConfirmationType::Timeout),
            2 => Ok(ConfirmationType::Error),
            other => Err(ConfirmationError::UnknownType(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationMessage {
    pub file_size: u64,
    pub job_number: JobId,
    pub unique_name_offset: u16,
    pub file_name_length: u16,
    pub confirmation_type: ConfirmationType,
    pub hostname: String,
    pub file_name: String,
}

impl ConfirmationMessage {
    pub fn encode(&self) -> Result<Vec<u8>, ConfirmationError> {
        if self.hostname.len() > MAX_HOSTNAME_LEN {
            return Err(ConfirmationError::HostnameTooLong);
        }

        let mut buf = Vec::with_capacity(FIXED_PREFIX_LEN + self.file_name.len() + 1);
        buf.extend_from_slice(&pad8(self.file_size));
        buf.extend_from_slice(&pad8(self.job_number.get() as u64));
        buf.extend_from_slice(&self.unique_name_offset.to_le_bytes());
        buf.extend_from_slice(&self.file_name_length.to_le_bytes());
        buf.push(self.confirmation_type as u8);

        let mut hostname_field = [0u8; MAX_HOSTNAME_LEN + 1];
        hostname_field[..self.hostname.len()].copy_from_slice(self.hostname.as_bytes());
        buf.extend_from_slice(&hostname_field);

        buf.extend_from_slice(self.file_name.as_bytes());
        buf.push(0);

        Ok(buf)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ConfirmationError> {
        if bytes.len() < FIXED_PREFIX_LEN {
            return Err(ConfirmationError::TooShort);
        }

        let mut offset = 0;
        let file_size = unpad8(&bytes[offset..offset + PADDED_FIELD_WIDTH]);
        offset += PADDED_FIELD_WIDTH;
        let job_number = unpad8(&bytes[offset..offset + PADDED_FIELD_WIDTH]) as u32;
        offset += PADDED_FIELD_WIDTH;
        let unique_name_offset = u16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
        offset += 2;
        let file_name_length = u16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
        offset += 2;
        let confirmation_type = ConfirmationType::from_byte(bytes[offset])?;
        offset += 1;

        let hostname_field = &bytes[offset..offset + MAX_HOSTNAME_LEN + 1];
        let nul = hostname_field
            .iter()
            .position(|&b| b == 0)
            .ok_or(ConfirmationError::UnterminatedHostname)?;
        let hostname = String::from_utf8_lossy(&hostname_field[..nul]).into_owned();
        offset += MAX_HOSTNAME_LEN + 1;

        let rest = &bytes[offset..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(ConfirmationError::UnterminatedFileName)?;
        let file_name = String::from_utf8_lossy(&rest[..nul]).into_owned();

        Ok(ConfirmationMessage {
            file_size,
            job_number: JobId::new(job_number),
            unique_name_offset,
            file_name_length,
            confirmation_type,
            hostname,
            file_name,
        })
    }
}

fn pad8(v: u64) -> [u8; 8] {
    v.to_le_bytes()
}

fn unpad8(bytes: &[u8]) -> u64 {
    let mut arr = [0u8; 8];
    arr.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(arr)
}

#[cfg(test)]
#[path = "confirmation_tests.rs"]
mod tests;

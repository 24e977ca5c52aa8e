// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Staging directory naming (spec §3.4, §6.5).
//!
//! `<priority><creation_time_hex>_<job_id_hex>_<split_job_counter_hex>_<unique_number_hex>/<dir_no_hex>/`

use crate::ids::{DirId, JobId, UniqueNumber};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StagingDirNameError {
    #[error("staging directory name missing the '/<dir_no>' segment")]
    MissingDirNoSegment,
    #[error("staging directory base name missing a priority character")]
    EmptyBaseName,
    #[error("staging directory base name is not formed of 4 '_'-separated fields")]
    WrongFieldCount,
    #[error("invalid hex segment {0:?}: {1}")]
    InvalidHex(String, std::num::ParseIntError),
}

/// Parsed/unparsed staging directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagingDirName {
    pub priority: u8,
    pub creation_time: u64,
    pub job_id: JobId,
    pub split_job_counter: u32,
    pub unique_number: UniqueNumber,
    pub dir_no: DirId,
}

impl StagingDirName {
    /// Render `<base>/<dir_no_hex>` (without a trailing slash; callers
    /// append one when creating the directory on disk).
    pub fn format(&self) -> String {
        format!(
            "{}{:x}_{:x}_{:x}_{:x}/{:x}",
            self.priority as char,
            self.creation_time,
            self.job_id.get(),
            self.split_job_counter,
            self.unique_number.get(),
            self.dir_no.get(),
        )
    }

    /// Parse a name produced by [`Self::format`] (or the equivalent path
    /// component sequence once a `/` has separated the directory number).
    pub fn parse(name: &str) -> Result<Self, StagingDirNameError> {
        let (base, dir_no_hex) = name
            .split_once('/')
            .ok_or(StagingDirNameError::MissingDirNoSegment)?;

        let mut chars = base.chars();
        let priority = chars.next().ok_or(StagingDirNameError::EmptyBaseName)? as u8;
        let rest: String = chars.collect();

        let fields: Vec<&str> = rest.split('_').collect();
        if fields.len() != 4 {
            return Err(StagingDirNameError::WrongFieldCount);
        }

        let parse_hex = |s: &str| -> Result<u64, StagingDirNameError> {
            u64::from_str_radix(s, 16).map_err(|e| StagingDirNameError::InvalidHex(s.into(), e))
        };

        let creation_time = parse_hex(fields[0])?;
        let job_id = parse_hex(fields[1])? as u32;
        let split_job_counter = parse_hex(fields[2])? as u32;
        let unique_number = parse_hex(fields[3])? as u32;
        let dir_no = parse_hex(dir_no_hex)? as u32;

        Ok(StagingDirName {
            priority,
            creation_time,
            job_id: JobId::new(job_id),
            split_job_counter,
            unique_number: UniqueNumber::new(unique_number),
            dir_no: DirId::new(dir_no),
        })
    }
}

#[cfg(test)]
#[path = "staging_tests.rs"]
mod tests;

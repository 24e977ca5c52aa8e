// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The resend / archive pipeline (spec §4.6): stage previously-archived
//! output-log selections into fresh job directories and republish them as
//! ordinary job messages, tagged with the `ShowOlogResend` originator.

use crate::error::ResendError;
use afd_core::job_message::Originator;
use afd_core::olog::OlogEntry;
use afd_core::staging::StagingDirName;
use afd_core::{DirId, Event, HostId, JobId, JobMessage, UniqueNumber};
use afd_storage::UniqueCounter;
use indexmap::IndexMap;
use nix::errno::Errno;
use std::collections::HashMap;
use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Dedicated sentinel directory id for resend-originated staging
/// directories: they are not produced by any watched source directory, so
/// there is no real `DirId` to encode in the staging name (spec §6.5).
pub const RESEND_DIR_NO: DirId = DirId::new(0);

/// A single prior-output selection: the output log to read and the byte
/// offset at which the recorded line begins (spec §4.6 step 1).
#[derive(Debug, Clone)]
pub struct ResendSelection {
    pub log_path: PathBuf,
    pub byte_offset: u64,
}

/// Reads and parses exactly one output-log line at `selection.byte_offset`.
fn read_selection(selection: &ResendSelection) -> Result<OlogEntry, ResendError> {
    let mut file = fs::File::open(&selection.log_path)?;
    file.seek(SeekFrom::Start(selection.byte_offset))?;
    let mut rest = String::new();
    file.read_to_string(&mut rest)?;
    let line = rest.lines().next().unwrap_or("");
    OlogEntry::parse(line).map_err(|e| ResendError::MalformedLogLine(e.to_string()))
}

/// One staged batch, ready to be published as a job message (spec §4.6
/// steps 2-3).
#[derive(Debug, Clone)]
pub struct ResendBatch {
    pub host_id: HostId,
    pub job_id: JobId,
    pub unique_number: UniqueNumber,
    pub staging_dir: String,
    pub message: JobMessage,
    pub files_to_send: u32,
    pub file_size_to_send: u64,
    pub overwrite_count: u32,
    pub not_in_archive: Vec<String>,
}

impl ResendBatch {
    /// Events a caller applies to make this batch's staging durable:
    /// the job enters the ready queue exactly like an AMG-produced job,
    /// HST's running totals advance, and an audit record is kept.
    pub fn publish_events(&self, now_ms: u64) -> Vec<Event> {
        vec![
            Event::JobEnqueued {
                message: self.message,
                staging_dir: self.staging_dir.clone(),
                created_at_ms: now_ms,
            },
            Event::HostCountersAdjusted {
                host_id: self.host_id,
                delta_files: self.files_to_send as i64,
                delta_bytes: self.file_size_to_send as i64,
            },
            Event::ResendStaged {
                job_id: self.job_id,
                host_id: self.host_id,
                unique_number: self.unique_number,
                files_to_send: self.files_to_send,
                file_size_to_send: self.file_size_to_send,
            },
        ]
    }

    /// The inverse of [`Self::publish_events`]'s HST update, for a caller
    /// whose downstream publish step (the real bus write) failed after
    /// this batch was already staged on disk (spec §4.6 "Failure
    /// semantics"). The staging directory itself is left for the janitor.
    pub fn rollback_events(&self) -> Vec<Event> {
        vec![
            Event::HostCountersAdjusted {
                host_id: self.host_id,
                delta_files: -(self.files_to_send as i64),
                delta_bytes: -(self.file_size_to_send as i64),
            },
            Event::ResendRolledBack {
                job_id: self.job_id,
                host_id: self.host_id,
                files_to_send: self.files_to_send,
                file_size_to_send: self.file_size_to_send,
            },
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResendSummary {
    pub batches: Vec<ResendBatch>,
    pub limit_reached: bool,
    pub total_staged: u32,
}

/// Links (or copies, on failure) one archived file into a staging
/// directory, per the fallback ladder in spec §4.6 step 3.
fn stage_one_file(
    entry: &OlogEntry,
    staging_dir: &Path,
    overwrite_count: &mut u32,
    not_in_archive: &mut Vec<String>,
) -> Option<u64> {
    let src = entry.archive_path();
    let dest = staging_dir.join(&entry.filename);

    let link_result = fs::hard_link(&src, &dest);
    let staged = match link_result {
        Ok(()) => true,
        Err(err) => match err.raw_os_error().map(Errno::from_i32) {
            Some(Errno::EEXIST) => {
                *overwrite_count += 1;
                fs::copy(&src, &dest).is_ok()
            }
            Some(Errno::EXDEV) => fs::copy(&src, &dest).is_ok(),
            _ => false,
        },
    };

    if !staged {
        not_in_archive.push(entry.filename.clone());
        return None;
    }

    // Best-effort: bump mtime so age-based purgers don't reap this staged
    // copy prematurely. A read-only destination is an accepted risk.
    if let Ok(f) = fs::OpenOptions::new().write(true).open(&dest) {
        let _ = f.set_modified(std::time::SystemTime::now());
    }

    fs::metadata(&src).ok().map(|m| m.len())
}

/// Pre-resolves the host each resend selection's job belongs to, by
/// matching the output log's recorded alias (spec §6.4) against the live
/// host table. `run_resend` groups by `job_id` alone and never sees the
/// underlying log lines, so a caller needing alias-based routing must
/// build this map first and hand back a `job_id`-keyed closure over it.
pub fn resolve_hosts(
    selections: &[ResendSelection],
    host_id_for_alias: impl Fn(&str) -> Option<HostId>,
) -> Result<HashMap<JobId, HostId>, ResendError> {
    let mut hosts = HashMap::new();
    for selection in selections {
        let entry = read_selection(selection)?;
        if let Some(host_id) = host_id_for_alias(&entry.alias) {
            hosts.entry(entry.job_id).or_insert(host_id);
        }
    }
    Ok(hosts)
}

/// Runs the full resend pipeline over `selections`, staging at most
/// `max_copied_files` per job-id group per batch and stopping once
/// `resend_limit` files have been staged in total.
#[allow(clippy::too_many_arguments)]
pub fn run_resend(
    selections: &[ResendSelection],
    job_priorities: &HashMap<JobId, u8>,
    host_for_job: impl Fn(JobId) -> Option<HostId>,
    spool_root: &Path,
    counter: &dyn UniqueCounter,
    max_copied_files: u32,
    resend_limit: u32,
    now_ms: u64,
) -> Result<ResendSummary, ResendError> {
    let mut grouped: IndexMap<JobId, Vec<OlogEntry>> = IndexMap::new();
    for selection in selections {
        let entry = read_selection(selection)?;
        grouped.entry(entry.job_id).or_default().push(entry);
    }

    let mut summary = ResendSummary::default();

    'groups: for (job_id, entries) in grouped {
        let priority = *job_priorities
            .get(&job_id)
            .ok_or(ResendError::UnknownJobPriority(job_id))?;
        let host_id = match host_for_job(job_id) {
            Some(id) => id,
            None => {
                tracing::warn!(job_id = job_id.get(), "resend job has no routable host, skipping");
                continue;
            }
        };

        for batch_entries in entries.chunks(max_copied_files.max(1) as usize) {
            if summary.total_staged >= resend_limit {
                summary.limit_reached = true;
                break 'groups;
            }

            let unique_number = counter.allocate(1)?;
            let staging_name = StagingDirName {
                priority,
                creation_time: now_ms / 1000,
                job_id,
                split_job_counter: 0,
                unique_number,
                dir_no: RESEND_DIR_NO,
            };
            let staging_rel = staging_name.format();
            let staging_dir = spool_root.join(&staging_rel);
            fs::create_dir_all(&staging_dir)?;

            let mut files_to_send = 0u32;
            let mut file_size_to_send = 0u64;
            let mut overwrite_count = 0u32;
            let mut not_in_archive = Vec::new();

            for entry in batch_entries {
                if let Some(size) = stage_one_file(
                    entry,
                    &staging_dir,
                    &mut overwrite_count,
                    &mut not_in_archive,
                ) {
                    files_to_send += 1;
                    file_size_to_send += size;
                }
            }

            let message = JobMessage {
                creation_time: now_ms / 1000,
                file_size: file_size_to_send,
                job_id,
                split_job_counter: 0,
                files_to_send,
                unique_number,
                dir_no: RESEND_DIR_NO,
                priority,
                originator: Originator::ShowOlogResend,
            };

            tracing::debug!(
                job_id = job_id.get(),
                host_id = host_id.get(),
                files_to_send,
                overwrite_count,
                "staged resend batch"
            );
            summary.total_staged += files_to_send;
            summary.batches.push(ResendBatch {
                host_id,
                job_id,
                unique_number,
                staging_dir: staging_rel,
                message,
                files_to_send,
                file_size_to_send,
                overwrite_count,
                not_in_archive,
            });
        }
    }

    Ok(summary)
}

#[cfg(test)]
#[path = "resend_tests.rs"]
mod tests;

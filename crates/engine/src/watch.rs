// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The AMG-equivalent directory watcher (SPEC_FULL §3.10): polls watched
//! source directories whose `next_check_time` has elapsed, lists new
//! files, and stages + enqueues them the same way the resend pipeline
//! does, tagged with the `Amg` originator.

use crate::error::WatchError;
use crate::route::RouteTable;
use afd_core::job_message::Originator;
use afd_core::staging::StagingDirName;
use afd_core::{DirFlags, DirId, DirectorySlot, Event, JobId, JobMessage};
use afd_storage::UniqueCounter;
use std::fs;
use std::path::{Path, PathBuf};

/// One directory this workspace watches: where its files originate and
/// how often it is polled.
#[derive(Debug, Clone)]
pub struct WatchTarget {
    pub dir_id: DirId,
    pub source_path: PathBuf,
    pub scan_interval_ms: u64,
}

/// The fixed set of directories a daemon instance watches, keyed by
/// `dir_id` so a DST lookup maps directly to a filesystem path.
#[derive(Debug, Clone, Default)]
pub struct DirectoryWatcher {
    targets: Vec<WatchTarget>,
}

impl DirectoryWatcher {
    pub fn new(targets: Vec<WatchTarget>) -> Self {
        Self { targets }
    }

    pub fn target(&self, dir_id: DirId) -> Option<&WatchTarget> {
        self.targets.iter().find(|t| t.dir_id == dir_id)
    }

    /// Directories due for a poll: in-config (checked by the caller via
    /// DST), not disabled/stopped, and whose deadline has elapsed.
    pub fn due_targets<'a>(
        &'a self,
        dirs: impl Iterator<Item = &'a DirectorySlot>,
        now_ms: u64,
    ) -> Vec<&'a WatchTarget> {
        dirs.filter(|d| {
            d.next_check_time <= now_ms
                && !d
                    .flags
                    .intersects(DirFlags::DIR_DISABLED | DirFlags::DIR_STOPPED)
        })
        .filter_map(|d| self.target(d.dir_id))
        .collect()
    }

    /// Lists the files currently sitting in `target`'s source path, in a
    /// stable order.
    fn list_new_files(target: &WatchTarget) -> std::io::Result<Vec<PathBuf>> {
        let mut entries: Vec<_> = fs::read_dir(&target.source_path)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .collect();
        entries.sort_by_key(|e| e.file_name());
        Ok(entries.into_iter().map(|e| e.path()).collect())
    }

    /// Polls one target: if files are present, stages them into a fresh
    /// job directory under `spool_root` and returns the events to enqueue
    /// the job (establishing the destination host's backlog exactly like a
    /// resend does, spec §4.4/§8 P5), always paired with the next-scan
    /// reschedule event.
    pub fn poll(
        &self,
        target: &WatchTarget,
        routes: &RouteTable,
        spool_root: &Path,
        counter: &dyn UniqueCounter,
        job_id: JobId,
        priority: u8,
        now_ms: u64,
    ) -> Result<Vec<Event>, WatchError> {
        let files = Self::list_new_files(target)?;
        let mut events = Vec::new();

        if !files.is_empty() {
            let unique_number = counter.allocate(1)?;
            let staging_name = StagingDirName {
                priority,
                creation_time: now_ms / 1000,
                job_id,
                split_job_counter: 0,
                unique_number,
                dir_no: target.dir_id,
            };
            let staging_rel = staging_name.format();
            let staging_dir = spool_root.join(&staging_rel);
            fs::create_dir_all(&staging_dir)?;

            let mut file_size = 0u64;
            for path in &files {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                fs::rename(path, staging_dir.join(&name))?;
                file_size += fs::metadata(staging_dir.join(&name))?.len();
            }

            let message = JobMessage {
                creation_time: now_ms / 1000,
                file_size,
                job_id,
                split_job_counter: 0,
                files_to_send: files.len() as u32,
                unique_number,
                dir_no: target.dir_id,
                priority,
                originator: Originator::Amg,
            };

            tracing::debug!(
                dir_id = target.dir_id.get(),
                files = files.len(),
                file_size,
                "staged new job from watched directory"
            );
            events.push(Event::JobEnqueued {
                message,
                staging_dir: staging_rel,
                created_at_ms: now_ms,
            });
            if let Some(host_id) = routes.host_for(target.dir_id) {
                events.push(Event::HostCountersAdjusted {
                    host_id,
                    delta_files: files.len() as i64,
                    delta_bytes: file_size as i64,
                });
            }
        }

        events.push(Event::DirNextScanScheduled {
            dir_id: target.dir_id,
            next_check_time_ms: now_ms + target.scan_interval_ms,
        });

        Ok(events)
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;

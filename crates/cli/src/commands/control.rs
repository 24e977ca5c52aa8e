// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `afd amg`, `afd fd`, `afd check`, `afd stats`, `afd shutdown` — daemon-wide
//! controls that aren't scoped to a single host or directory.

use afd_daemon::{JobPriorityWire, ResendSelectionWire};
use anyhow::{Context, Result};
use clap::Subcommand;

use crate::client::DaemonClient;
use crate::output::OutputFormat;
use crate::table::{Column, Table};

#[derive(Subcommand)]
pub enum AmgCommand {
    /// Resume the directory-watch loop.
    Start,
    /// Pause the directory-watch loop.
    Stop,
    /// Flip the directory-watch loop on or off.
    Toggle,
}

#[derive(Subcommand)]
pub enum FdCommand {
    /// Resume the dispatch loop.
    Start,
    /// Pause the dispatch loop.
    Stop,
    /// Flip the dispatch loop on or off.
    Toggle,
}

pub async fn handle_amg(command: AmgCommand) -> Result<()> {
    let client = DaemonClient::for_action()?;
    match command {
        AmgCommand::Start => client.start_amg().await?,
        AmgCommand::Stop => client.stop_amg().await?,
        AmgCommand::Toggle => client.toggle_amg().await?,
    }
    Ok(())
}

pub async fn handle_fd(command: FdCommand) -> Result<()> {
    let client = DaemonClient::for_action()?;
    match command {
        FdCommand::Start => client.start_fd().await?,
        FdCommand::Stop => client.stop_fd().await?,
        FdCommand::Toggle => client.toggle_fd().await?,
    }
    Ok(())
}

/// Force an immediate directory scan, optionally limited to one directory.
pub async fn check_dirs(dir: Option<String>) -> Result<()> {
    DaemonClient::for_action()?.force_file_dir_check(dir).await?;
    Ok(())
}

/// Reread the host/route configuration files from disk.
pub async fn reread_routes() -> Result<()> {
    DaemonClient::for_action()?.reread_loc_interface_file().await?;
    Ok(())
}

/// Force an immediate archive sweep over the given output-log selections.
///
/// `selections` are `path:byte_offset` pairs naming one archived line
/// each; `priorities` are `job_id=priority` overrides for the resend
/// (defaulting to 0 when omitted, see `JobPriorityWire`).
pub async fn archive_check(selections: Vec<String>, priorities: Vec<String>) -> Result<()> {
    let selections = selections
        .iter()
        .map(|s| parse_selection(s))
        .collect::<Result<Vec<_>>>()?;
    let priorities = priorities
        .iter()
        .map(|p| parse_priority(p))
        .collect::<Result<Vec<_>>>()?;

    let report = DaemonClient::for_action()?
        .force_archive_check(selections, priorities)
        .await?;

    println!(
        "staged {} file(s){}",
        report.files_staged,
        if report.limit_reached { " (resend limit reached)" } else { "" }
    );
    for name in &report.not_in_archive {
        println!("not in archive: {name}");
    }
    Ok(())
}

fn parse_selection(raw: &str) -> Result<ResendSelectionWire> {
    let (path, offset) = raw
        .rsplit_once(':')
        .with_context(|| format!("expected PATH:OFFSET, got {raw:?}"))?;
    Ok(ResendSelectionWire {
        log_path: path.to_string(),
        byte_offset: offset.parse().with_context(|| format!("invalid byte offset in {raw:?}"))?,
    })
}

fn parse_priority(raw: &str) -> Result<JobPriorityWire> {
    let (job_id, priority) = raw
        .split_once('=')
        .with_context(|| format!("expected JOB_ID=PRIORITY, got {raw:?}"))?;
    Ok(JobPriorityWire {
        job_id: job_id.parse().with_context(|| format!("invalid job id in {raw:?}"))?,
        priority: priority.parse().with_context(|| format!("invalid priority in {raw:?}"))?,
    })
}

/// Force an immediate search for files left behind by a previous run.
pub async fn search_old_files() -> Result<()> {
    DaemonClient::for_action()?.force_search_old_files().await?;
    Ok(())
}

/// Ask the daemon to shut down gracefully.
pub async fn shutdown() -> Result<()> {
    DaemonClient::for_action()?.shutdown().await?;
    println!("shutdown requested");
    Ok(())
}

pub async fn stats(format: OutputFormat) -> Result<()> {
    let stats = DaemonClient::for_query()?.exec_statistics().await?;
    crate::output::emit(format, &stats, |stats| {
        let mut table = Table::new(vec![
            Column::left("HOST"),
            Column::right("FILES"),
            Column::right("BYTES"),
            Column::right("ERRORS"),
        ]);
        for s in stats {
            table.row(vec![
                s.host_alias.clone(),
                s.total_file_counter.to_string(),
                s.total_file_size.to_string(),
                s.error_counter.to_string(),
            ]);
        }
        let mut buf = Vec::new();
        table.render(&mut buf);
        String::from_utf8_lossy(&buf).trim_end().to_string()
    });
    Ok(())
}

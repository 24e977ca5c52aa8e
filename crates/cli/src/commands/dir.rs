// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `afd dir ...` — watched-directory control and inspection.

use anyhow::Result;
use clap::Subcommand;

use crate::client::DaemonClient;
use crate::output::OutputFormat;
use crate::table::{Column, Table};

#[derive(Subcommand)]
pub enum DirCommand {
    /// List all configured directories.
    List,
    /// Show one directory's full status.
    Show { dir: String },
    /// Bring a directory back into service.
    Enable { dir: String },
    /// Take a directory out of service (files still accumulate, unwatched).
    Disable { dir: String },
    /// Force an immediate rescan, ignoring the next-check timer.
    Rescan { dir: String },
}

pub async fn handle(command: DirCommand, format: OutputFormat) -> Result<()> {
    match command {
        DirCommand::List => list(format).await,
        DirCommand::Show { dir } => show(dir, format).await,
        DirCommand::Enable { dir } => {
            DaemonClient::for_action()?.enable_dir(dir).await?;
            Ok(())
        }
        DirCommand::Disable { dir } => {
            DaemonClient::for_action()?.disable_dir(dir).await?;
            Ok(())
        }
        DirCommand::Rescan { dir } => {
            DaemonClient::for_action()?.rescan(dir).await?;
            Ok(())
        }
    }
}

async fn list(format: OutputFormat) -> Result<()> {
    let dirs = DaemonClient::for_query()?.list_dirs().await?;
    crate::output::emit(format, &dirs, |dirs| {
        let mut table = Table::new(vec![
            Column::left("DIR"),
            Column::left("HOST"),
            Column::right("NEXT CHECK"),
            Column::left("FLAGS"),
        ]);
        for dir in dirs {
            table.row(vec![
                dir.dir_alias.clone(),
                dir.host_alias.clone().unwrap_or_else(|| "-".to_string()),
                dir.next_check_time.to_string(),
                dir.flags.join(","),
            ]);
        }
        let mut buf = Vec::new();
        table.render(&mut buf);
        String::from_utf8_lossy(&buf).trim_end().to_string()
    });
    Ok(())
}

async fn show(dir: String, format: OutputFormat) -> Result<()> {
    let summary = DaemonClient::for_query()?.get_dir(dir.clone()).await?;
    match summary {
        Some(summary) => {
            crate::output::emit(format, &summary, |s| {
                format!(
                    "{}: host {} next check {} flags [{}]",
                    s.dir_alias,
                    s.host_alias.as_deref().unwrap_or("-"),
                    s.next_check_time,
                    s.flags.join(","),
                )
            });
            Ok(())
        }
        None => {
            eprintln!("unknown directory alias: {dir}");
            std::process::exit(1);
        }
    }
}

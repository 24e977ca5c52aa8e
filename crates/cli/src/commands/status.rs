// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `afd status` — a snapshot (or live-refreshed view) of daemon health.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::client::{ClientError, DaemonClient};
use crate::output::OutputFormat;

#[derive(Args)]
pub struct StatusArgs {
    /// Keep refreshing the display instead of printing once and exiting.
    #[arg(long)]
    pub watch: bool,

    /// Refresh interval in seconds when `--watch` is set.
    #[arg(long, default_value_t = 2)]
    pub interval: u64,
}

#[derive(Serialize)]
struct StatusSnapshot {
    running: bool,
    uptime_secs: u64,
    host_count: usize,
    dir_count: usize,
    pending_jobs: usize,
    amg_enabled: bool,
    fd_enabled: bool,
}

pub async fn handle(args: StatusArgs, format: OutputFormat) -> Result<()> {
    if args.watch {
        loop {
            // Cursor home + clear-to-end, so each refresh overwrites the last.
            print!("\x1b[H\x1b[J");
            render_once(format).await?;
            tokio::time::sleep(Duration::from_secs(args.interval.max(1))).await;
        }
    } else {
        render_once(format).await
    }
}

async fn render_once(format: OutputFormat) -> Result<()> {
    let snapshot = match DaemonClient::for_query() {
        Ok(client) => match client.status().await {
            Ok(afd_daemon::Response::Status {
                uptime_secs,
                host_count,
                dir_count,
                pending_jobs,
                amg_enabled,
                fd_enabled,
            }) => StatusSnapshot {
                running: true,
                uptime_secs,
                host_count,
                dir_count,
                pending_jobs,
                amg_enabled,
                fd_enabled,
            },
            Ok(_) => anyhow::bail!("unexpected response from daemon"),
            Err(ClientError::DaemonNotRunning) => not_running(),
            Err(e) => return Err(e.into()),
        },
        Err(ClientError::DaemonNotRunning) => not_running(),
        Err(e) => return Err(e.into()),
    };

    crate::output::emit(format, &snapshot, |s| {
        if !s.running {
            "daemon not running".to_string()
        } else {
            format!(
                "afdd running, uptime {}s — {} hosts, {} dirs, {} pending jobs, amg {}, fd {}",
                s.uptime_secs,
                s.host_count,
                s.dir_count,
                s.pending_jobs,
                if s.amg_enabled { "on" } else { "off" },
                if s.fd_enabled { "on" } else { "off" },
            )
        }
    });
    Ok(())
}

fn not_running() -> StatusSnapshot {
    StatusSnapshot {
        running: false,
        uptime_secs: 0,
        host_count: 0,
        dir_count: 0,
        pending_jobs: 0,
        amg_enabled: false,
        fd_enabled: false,
    }
}

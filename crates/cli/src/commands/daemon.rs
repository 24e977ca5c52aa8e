// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `afd daemon start/stop/status` — manage the `afdd` process itself,
//! as opposed to `afd status` which reports on what it's doing.

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Subcommand;

use crate::client::{ClientError, DaemonClient};
use crate::daemon_process;

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start `afdd` in the background if it isn't already running.
    Start,
    /// Stop `afdd`, gracefully first, then forcibly if needed.
    Stop,
    /// Report whether `afdd` is running and reachable.
    Status,
}

pub async fn handle(command: DaemonCommand) -> Result<()> {
    match command {
        DaemonCommand::Start => start().await,
        DaemonCommand::Stop => stop().await,
        DaemonCommand::Status => status().await,
    }
}

async fn start() -> Result<()> {
    let socket_path = daemon_process::daemon_socket()?;
    if daemon_process::probe_socket(&socket_path) {
        println!("afdd already running");
        return Ok(());
    }

    daemon_process::cleanup_stale_socket()?;
    let client = DaemonClient::for_action()?;
    client.ping().await?;
    println!("afdd started");
    Ok(())
}

async fn stop() -> Result<()> {
    let socket_path = daemon_process::daemon_socket()?;

    match DaemonClient::for_query() {
        Ok(client) => match client.shutdown().await {
            Ok(()) => {
                wait_for_socket_gone(&socket_path, crate::client::timeout_exit());
            }
            Err(_) => {
                // Fall through to a forced stop below.
            }
        },
        Err(ClientError::DaemonNotRunning) => {
            println!("afdd is not running");
            return Ok(());
        }
        Err(_) => {}
    }

    if daemon_process::probe_socket(&socket_path) {
        daemon_process::stop_daemon_sync();
    } else {
        daemon_process::cleanup_stale_socket()?;
    }
    println!("afdd stopped");
    Ok(())
}

fn wait_for_socket_gone(socket_path: &std::path::Path, timeout: Duration) {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if !daemon_process::probe_socket(socket_path) {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

async fn status() -> Result<()> {
    let socket_path = daemon_process::daemon_socket()?;
    if !daemon_process::probe_socket(&socket_path) {
        println!("afdd is not running");
        return Ok(());
    }

    match daemon_process::read_daemon_pid()? {
        Some(pid) => println!("afdd running (pid {pid})"),
        None => println!("afdd running"),
    }
    Ok(())
}

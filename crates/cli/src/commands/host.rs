// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `afd host ...` — queue/transfer control and inspection for one host.

use anyhow::Result;
use clap::{Subcommand, ValueEnum};

use afd_core::host::DebugMode;

use crate::client::DaemonClient;
use crate::output::OutputFormat;
use crate::table::{Column, Table};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DebugModeArg {
    Normal,
    Debug,
    Trace,
    FullTrace,
}

impl From<DebugModeArg> for DebugMode {
    fn from(value: DebugModeArg) -> Self {
        match value {
            DebugModeArg::Normal => DebugMode::Normal,
            DebugModeArg::Debug => DebugMode::Debug,
            DebugModeArg::Trace => DebugMode::Trace,
            DebugModeArg::FullTrace => DebugMode::FullTrace,
        }
    }
}

#[derive(Subcommand)]
pub enum HostCommand {
    /// List all configured hosts.
    List,
    /// Show one host's full status.
    Show { host: String },
    /// Resume queuing jobs for a paused host.
    StartQueue { host: String },
    /// Pause queuing new jobs for a host (in-flight transfers finish).
    StopQueue { host: String },
    /// Resume sending data to a host.
    StartTransfer { host: String },
    /// Stop sending data to a host immediately.
    StopTransfer { host: String },
    /// Bring a host back into service.
    Enable { host: String },
    /// Take a host out of service.
    Disable { host: String },
    /// Flip which of the two configured real hostnames is active.
    Toggle { host: String },
    /// Set one of the two real hostnames a host alias resolves to.
    SetHostname {
        host: String,
        /// 0 or 1 — which hostname slot to set.
        position: u8,
        hostname: String,
    },
    /// Force an immediate retry, clearing backoff state.
    Retry { host: String },
    /// Change how verbosely a host's transfers are logged.
    SetDebug { host: String, mode: DebugModeArg },
    /// Toggle simulated sends (no real network traffic).
    Simulate {
        host: String,
        #[arg(value_enum)]
        enabled: OnOff,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OnOff {
    On,
    Off,
}

pub async fn handle(command: HostCommand, format: OutputFormat) -> Result<()> {
    match command {
        HostCommand::List => list(format).await,
        HostCommand::Show { host } => show(host, format).await,
        HostCommand::StartQueue { host } => {
            DaemonClient::for_action()?.start_queue(host).await?;
            Ok(())
        }
        HostCommand::StopQueue { host } => {
            DaemonClient::for_action()?.stop_queue(host).await?;
            Ok(())
        }
        HostCommand::StartTransfer { host } => {
            DaemonClient::for_action()?.start_transfer(host).await?;
            Ok(())
        }
        HostCommand::StopTransfer { host } => {
            DaemonClient::for_action()?.stop_transfer(host).await?;
            Ok(())
        }
        HostCommand::Enable { host } => {
            DaemonClient::for_action()?.enable_host(host).await?;
            Ok(())
        }
        HostCommand::Disable { host } => {
            DaemonClient::for_action()?.disable_host(host).await?;
            Ok(())
        }
        HostCommand::Toggle { host } => {
            DaemonClient::for_action()?.switch_host_toggle(host).await?;
            Ok(())
        }
        HostCommand::SetHostname {
            host,
            position,
            hostname,
        } => {
            DaemonClient::for_action()?
                .set_real_hostname(host, position, hostname)
                .await?;
            Ok(())
        }
        HostCommand::Retry { host } => {
            DaemonClient::for_action()?.retry(host).await?;
            Ok(())
        }
        HostCommand::SetDebug { host, mode } => {
            DaemonClient::for_action()?
                .set_debug_mode(host, mode.into())
                .await?;
            Ok(())
        }
        HostCommand::Simulate { host, enabled } => {
            DaemonClient::for_action()?
                .set_simulate_send(host, matches!(enabled, OnOff::On))
                .await?;
            Ok(())
        }
    }
}

async fn list(format: OutputFormat) -> Result<()> {
    let hosts = DaemonClient::for_query()?.list_hosts().await?;
    crate::output::emit(format, &hosts, |hosts| {
        let mut table = Table::new(vec![
            Column::left("HOST"),
            Column::left("HOSTNAME"),
            Column::right("ACTIVE"),
            Column::right("ALLOWED"),
            Column::right("ERRORS"),
            Column::status("STATUS"),
        ]);
        for host in hosts {
            table.row(vec![
                host.host_alias.clone(),
                host.current_hostname.clone(),
                host.active_transfers.to_string(),
                host.allowed_transfers.to_string(),
                host.error_counter.to_string(),
                host.status_color.clone(),
            ]);
        }
        let mut buf = Vec::new();
        table.render(&mut buf);
        String::from_utf8_lossy(&buf).trim_end().to_string()
    });
    Ok(())
}

async fn show(host: String, format: OutputFormat) -> Result<()> {
    let summary = DaemonClient::for_query()?.get_host(host.clone()).await?;
    match summary {
        Some(summary) => {
            crate::output::emit(format, &summary, |s| {
                format!(
                    "{}: {} ({}/{} slots, {} files, {} bytes, status {})",
                    s.host_alias,
                    s.current_hostname,
                    s.active_transfers,
                    s.allowed_transfers,
                    s.total_file_counter,
                    s.total_file_size,
                    s.status_color,
                )
            });
            Ok(())
        }
        None => {
            eprintln!("unknown host alias: {host}");
            std::process::exit(1);
        }
    }
}

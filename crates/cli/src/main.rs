// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `afd` — the control CLI for the automatic file distribution daemon.
//!
//! Talks to a running `afdd` over its Unix control socket (SPEC_FULL §4),
//! auto-starting it for action commands when nothing is listening yet.

mod client;
mod color;
mod commands;
mod daemon_process;
mod env;
mod output;
mod table;

use clap::{Parser, Subcommand};

use commands::control::{AmgCommand, FdCommand};
use commands::daemon::DaemonCommand;
use commands::dir::DirCommand;
use commands::host::HostCommand;
use commands::status::StatusArgs;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "afd", version, about = "Control the file distribution daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output format for commands that print structured data.
    #[arg(long, global = true, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Report daemon health and activity.
    Status(StatusArgs),
    /// Host queue/transfer control and inspection.
    Host {
        #[command(subcommand)]
        command: HostCommand,
    },
    /// Watched-directory control and inspection.
    Dir {
        #[command(subcommand)]
        command: DirCommand,
    },
    /// Control the directory-watch loop.
    Amg {
        #[command(subcommand)]
        command: AmgCommand,
    },
    /// Control the dispatch loop.
    Fd {
        #[command(subcommand)]
        command: FdCommand,
    },
    /// Force an immediate directory scan.
    Check {
        /// Limit the scan to one directory alias.
        dir: Option<String>,
    },
    /// Reread host/route configuration files from disk.
    RereadRoutes,
    /// Force an immediate archive sweep over prior output-log selections.
    ArchiveCheck {
        /// Output-log selection as `path:byte_offset`; repeatable.
        #[arg(long = "select", value_name = "PATH:OFFSET")]
        select: Vec<String>,
        /// Priority override for one job id as `job_id=priority`; repeatable.
        #[arg(long = "priority", value_name = "JOB_ID=PRIORITY")]
        priority: Vec<String>,
    },
    /// Force an immediate search for files left behind by a previous run.
    SearchOldFiles,
    /// Per-host transfer statistics.
    Stats,
    /// Ask the daemon to shut down gracefully.
    Shutdown,
    /// Manage the `afdd` process itself.
    Daemon {
        #[command(subcommand)]
        command: DaemonCommand,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Status(args) => commands::status::handle(args, cli.output).await,
        Command::Host { command } => commands::host::handle(command, cli.output).await,
        Command::Dir { command } => commands::dir::handle(command, cli.output).await,
        Command::Amg { command } => commands::control::handle_amg(command).await,
        Command::Fd { command } => commands::control::handle_fd(command).await,
        Command::Check { dir } => commands::control::check_dirs(dir).await,
        Command::RereadRoutes => commands::control::reread_routes().await,
        Command::ArchiveCheck { select, priority } => commands::control::archive_check(select, priority).await,
        Command::SearchOldFiles => commands::control::search_old_files().await,
        Command::Stats => commands::control::stats(cli.output).await,
        Command::Shutdown => commands::control::shutdown().await,
        Command::Daemon { command } => commands::daemon::handle(command).await,
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! afdd — the automatic file distribution daemon.
//!
//! Background process that watches configured directories, stages files
//! into jobs, and dispatches them to remote hosts over whichever transfer
//! protocol each host is configured for (SPEC_FULL §3). Controlled over a
//! Unix socket by the `afd` CLI; should not normally be invoked directly.

use std::time::Duration;

use afd_daemon::config::Config;
use afd_daemon::lifecycle::{self, LifecycleError, StartupResult};
use afd_daemon::protocol::protocol_version;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("afdd {}", protocol_version());
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("afdd {}", protocol_version());
                println!("Automatic file distribution daemon");
                println!();
                println!("USAGE:");
                println!("    afdd");
                println!();
                println!("Typically started by the `afd` CLI and not invoked directly.");
                println!("Listens on a Unix socket for commands from `afd`.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: afdd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;

    rotate_log_if_needed(&config.log_path);
    write_startup_marker(&config)?;
    let log_guard = setup_logging(&config)?;

    info!("starting afdd");

    let StartupResult {
        daemon,
        listener: unix_listener,
        event_reader: _event_reader,
    } = match lifecycle::startup(&config).await {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&config.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            let version = std::fs::read_to_string(&config.version_path)
                .unwrap_or_default()
                .trim()
                .to_string();

            eprintln!("afdd is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            if !version.is_empty() {
                let current = protocol_version();
                if version == current {
                    eprintln!("  version: {version}");
                } else {
                    eprintln!("  version: {version} (outdated — current: {current})");
                }
            }
            std::process::exit(1);
        }
        Err(e) => {
            write_startup_error(&config, &e);
            error!(error = %e, "failed to start daemon");
            drop(log_guard);
            return Err(e.into());
        }
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let daemon = std::sync::Arc::new(daemon);
    tokio::spawn(afd_daemon::listener::run(
        unix_listener,
        std::sync::Arc::clone(&daemon),
        shutdown_rx.clone(),
    ));
    tokio::spawn(afd_daemon::dispatch_loop::run(
        std::sync::Arc::clone(&daemon),
        shutdown_rx.clone(),
    ));

    spawn_checkpoint_task(std::sync::Arc::clone(&daemon));
    spawn_flush_task(std::sync::Arc::clone(&daemon));

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(socket = %config.socket_path.display(), "daemon ready");
    println!("READY");

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }
    let _ = shutdown_tx.send(true);

    // Give the listener/dispatch/worker tasks a moment to observe the
    // shutdown signal and wind down in-flight work before the final
    // snapshot is taken; none of this needs exclusive access to `daemon`,
    // since `shutdown` only touches fields with interior mutability.
    tokio::time::sleep(Duration::from_millis(200)).await;

    daemon.shutdown()?;
    info!("daemon stopped");
    Ok(())
}

fn spawn_checkpoint_task(daemon: std::sync::Arc<afd_daemon::lifecycle::DaemonState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(daemon.tuning.checkpoint_interval());
        loop {
            interval.tick().await;
            match daemon.checkpoint() {
                Ok(0) => {}
                Ok(seq) => info!(seq, "checkpoint complete"),
                Err(e) => warn!(error = %e, "checkpoint failed, WAL not truncated"),
            }
        }
    });
}

fn spawn_flush_task(daemon: std::sync::Arc<afd_daemon::lifecycle::DaemonState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(daemon.tuning.flush_interval());
        loop {
            interval.tick().await;
            if daemon.event_bus.needs_flush() {
                if let Err(e) = daemon.event_bus.flush() {
                    warn!(error = %e, "failed to flush event bus");
                }
            }
        }
    });
}

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ROTATED_LOGS: u32 = 3;

/// Shifts `afd.log` → `afd.log.1` → `afd.log.2` → `afd.log.3`, deleting the
/// oldest. Best-effort: rotation failures never block startup.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

const STARTUP_MARKER_PREFIX: &str = "--- afdd: starting (pid: ";

fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---\n", STARTUP_MARKER_PREFIX, std::process::id())?;
    Ok(())
}

fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR failed to start daemon: {error}");
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

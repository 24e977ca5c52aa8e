// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use afd_daemon::protocol::{self, protocol_version, ProtocolError};
use afd_daemon::{
    DirSummary, HostExecStat, HostSummary, JobPriorityWire, Query, Request, Response,
    ResendSelectionWire,
};
use thiserror::Error;
use tokio::net::UnixStream;

use crate::daemon_process::{
    cleanup_stale_socket, daemon_socket, probe_socket, read_startup_error,
    start_daemon_background, stop_daemon_sync, wrap_with_startup_error,
};

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

pub fn timeout_ipc() -> Duration {
    parse_duration_ms("AFD_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

pub fn timeout_connect() -> Duration {
    parse_duration_ms("AFD_TIMEOUT_CONNECT_MS").unwrap_or(Duration::from_secs(5))
}

pub fn timeout_exit() -> Duration {
    parse_duration_ms("AFD_TIMEOUT_EXIT_MS").unwrap_or(Duration::from_secs(2))
}

pub fn poll_interval() -> Duration {
    parse_duration_ms("AFD_CONNECT_POLL_MS").unwrap_or(Duration::from_millis(50))
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon not running")]
    DaemonNotRunning,
    #[error("failed to start daemon: {0}")]
    DaemonStartFailed(String),
    #[error("connection timeout waiting for daemon to start")]
    DaemonStartTimeout,
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("unexpected response from daemon")]
    UnexpectedResponse,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not determine state directory")]
    NoStateDir,
}

/// Outcome of one resend/archive pass, reported back for display (spec
/// §4.6 step 4 "user-visible summary").
pub struct ResendReport {
    pub files_staged: u32,
    pub limit_reached: bool,
    pub not_in_archive: Vec<String>,
}

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// For action commands that mutate daemon state: auto-starts the
    /// daemon if it isn't running, but restarts at most once per process
    /// to avoid looping against a daemon that can't stay up.
    pub fn for_action() -> Result<Self, ClientError> {
        Self::connect_or_start_once()
    }

    /// For query commands: connect only, never auto-start. If nothing is
    /// running there's nothing useful to query.
    pub fn for_query() -> Result<Self, ClientError> {
        Self::connect()
    }

    fn connect_or_start_once() -> Result<Self, ClientError> {
        static RESTARTED: AtomicBool = AtomicBool::new(false);

        if RESTARTED.load(Ordering::SeqCst) {
            return Self::connect_or_start();
        }

        let version_path = crate::daemon_process::daemon_dir()?.join("afd.version");
        if let Ok(daemon_version) = std::fs::read_to_string(&version_path) {
            let cli_version = protocol_version();
            if daemon_version.trim() != cli_version {
                RESTARTED.store(true, Ordering::SeqCst);
                eprintln!(
                    "warn: daemon version {} does not match cli version {cli_version}, restarting daemon",
                    daemon_version.trim(),
                );
                stop_daemon_sync();
            }
        }

        Self::connect_or_start()
    }

    fn connect_or_start() -> Result<Self, ClientError> {
        match Self::connect() {
            Ok(client) => {
                if probe_socket(&client.socket_path) {
                    Ok(client)
                } else {
                    cleanup_stale_socket()?;
                    let child = start_daemon_background()?;
                    Self::connect_with_retry(timeout_connect(), child)
                }
            }
            Err(ClientError::DaemonNotRunning) => {
                let child = start_daemon_background()?;
                Self::connect_with_retry(timeout_connect(), child)
            }
            Err(e) => Err(wrap_with_startup_error(e)),
        }
    }

    /// Connect to an existing daemon; no auto-start.
    pub fn connect() -> Result<Self, ClientError> {
        let socket_path = daemon_socket()?;
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }
        Ok(Self { socket_path })
    }

    fn connect_with_retry(
        timeout: Duration,
        mut child: std::process::Child,
    ) -> Result<Self, ClientError> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            match child.try_wait() {
                Ok(Some(status)) => {
                    let poll_start = Instant::now();
                    while poll_start.elapsed() < timeout_exit() {
                        if let Some(err) = read_startup_error() {
                            return Err(ClientError::DaemonStartFailed(err));
                        }
                        std::thread::sleep(poll_interval());
                    }
                    return Err(ClientError::DaemonStartFailed(format!(
                        "exited with {status}"
                    )));
                }
                Ok(None) => {}
                Err(_) => {}
            }

            match Self::connect() {
                Ok(client) => return Ok(client),
                Err(ClientError::DaemonNotRunning) => std::thread::sleep(poll_interval()),
                Err(e) => return Err(wrap_with_startup_error(e)),
            }
        }

        Err(wrap_with_startup_error(ClientError::DaemonStartTimeout))
    }

    async fn send_with_timeout(
        &self,
        request: &Request,
        read_timeout: Duration,
        write_timeout: Duration,
    ) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        let data = protocol::encode(request)?;
        tokio::time::timeout(write_timeout, protocol::write_message(&mut writer, &data))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        let response_bytes =
            tokio::time::timeout(read_timeout, protocol::read_message(&mut reader))
                .await
                .map_err(|_| ProtocolError::Timeout)??;

        Ok(protocol::decode(&response_bytes)?)
    }

    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        self.send_with_timeout(request, timeout_ipc(), timeout_ipc())
            .await
    }

    /// Helper for requests that only expect `Ok`/`Error` back.
    async fn send_simple(&self, request: &Request) -> Result<(), ClientError> {
        match self.send(request).await? {
            Response::Ok => Ok(()),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::ShuttingDown => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn start_queue(&self, host: String) -> Result<(), ClientError> {
        self.send_simple(&Request::StartQueue { host }).await
    }
    pub async fn stop_queue(&self, host: String) -> Result<(), ClientError> {
        self.send_simple(&Request::StopQueue { host }).await
    }
    pub async fn start_transfer(&self, host: String) -> Result<(), ClientError> {
        self.send_simple(&Request::StartTransfer { host }).await
    }
    pub async fn stop_transfer(&self, host: String) -> Result<(), ClientError> {
        self.send_simple(&Request::StopTransfer { host }).await
    }
    pub async fn enable_host(&self, host: String) -> Result<(), ClientError> {
        self.send_simple(&Request::EnableHost { host }).await
    }
    pub async fn disable_host(&self, host: String) -> Result<(), ClientError> {
        self.send_simple(&Request::DisableHost { host }).await
    }
    pub async fn enable_dir(&self, dir: String) -> Result<(), ClientError> {
        self.send_simple(&Request::EnableDir { dir }).await
    }
    pub async fn disable_dir(&self, dir: String) -> Result<(), ClientError> {
        self.send_simple(&Request::DisableDir { dir }).await
    }
    pub async fn switch_host_toggle(&self, host: String) -> Result<(), ClientError> {
        self.send_simple(&Request::SwitchHostToggle { host }).await
    }
    pub async fn set_real_hostname(
        &self,
        host: String,
        position: u8,
        hostname: String,
    ) -> Result<(), ClientError> {
        self.send_simple(&Request::SetRealHostname {
            host,
            position,
            hostname,
        })
        .await
    }
    pub async fn retry(&self, host: String) -> Result<(), ClientError> {
        self.send_simple(&Request::Retry { host }).await
    }
    pub async fn rescan(&self, dir: String) -> Result<(), ClientError> {
        self.send_simple(&Request::Rescan { dir }).await
    }
    pub async fn set_debug_mode(
        &self,
        host: String,
        mode: afd_core::host::DebugMode,
    ) -> Result<(), ClientError> {
        self.send_simple(&Request::SetDebugMode { host, mode }).await
    }
    pub async fn set_simulate_send(&self, host: String, enabled: bool) -> Result<(), ClientError> {
        self.send_simple(&Request::SetSimulateSend { host, enabled })
            .await
    }
    pub async fn start_amg(&self) -> Result<(), ClientError> {
        self.send_simple(&Request::StartAmg).await
    }
    pub async fn stop_amg(&self) -> Result<(), ClientError> {
        self.send_simple(&Request::StopAmg).await
    }
    pub async fn toggle_amg(&self) -> Result<(), ClientError> {
        self.send_simple(&Request::ToggleAmg).await
    }
    pub async fn start_fd(&self) -> Result<(), ClientError> {
        self.send_simple(&Request::StartFd).await
    }
    pub async fn stop_fd(&self) -> Result<(), ClientError> {
        self.send_simple(&Request::StopFd).await
    }
    pub async fn toggle_fd(&self) -> Result<(), ClientError> {
        self.send_simple(&Request::ToggleFd).await
    }
    pub async fn force_file_dir_check(&self, dir: Option<String>) -> Result<(), ClientError> {
        self.send_simple(&Request::ForceFileDirCheck { dir }).await
    }
    pub async fn reread_loc_interface_file(&self) -> Result<(), ClientError> {
        self.send_simple(&Request::RereadLocInterfaceFile).await
    }
    pub async fn force_archive_check(
        &self,
        selections: Vec<ResendSelectionWire>,
        priorities: Vec<JobPriorityWire>,
    ) -> Result<ResendReport, ClientError> {
        match self.send(&Request::ForceArchiveCheck { selections, priorities }).await? {
            Response::ResendReport { files_staged, limit_reached, not_in_archive } => {
                Ok(ResendReport { files_staged, limit_reached, not_in_archive })
            }
            other => Self::reject(other),
        }
    }
    pub async fn force_search_old_files(&self) -> Result<(), ClientError> {
        self.send_simple(&Request::ForceSearchOldFiles).await
    }

    pub async fn status(&self) -> Result<Response, ClientError> {
        self.send(&Request::Status).await
    }

    pub async fn list_hosts(&self) -> Result<Vec<HostSummary>, ClientError> {
        match self.query(Query::ListHosts).await? {
            Response::Hosts { hosts } => Ok(hosts),
            other => Self::reject(other),
        }
    }

    pub async fn get_host(&self, host: String) -> Result<Option<HostSummary>, ClientError> {
        match self.query(Query::GetHost { host }).await? {
            Response::Host { host } => Ok(host),
            other => Self::reject(other),
        }
    }

    pub async fn list_dirs(&self) -> Result<Vec<DirSummary>, ClientError> {
        match self.query(Query::ListDirs).await? {
            Response::Dirs { dirs } => Ok(dirs),
            other => Self::reject(other),
        }
    }

    pub async fn get_dir(&self, dir: String) -> Result<Option<DirSummary>, ClientError> {
        match self.query(Query::GetDir { dir }).await? {
            Response::Dir { dir } => Ok(dir),
            other => Self::reject(other),
        }
    }

    pub async fn exec_statistics(&self) -> Result<Vec<HostExecStat>, ClientError> {
        match self.query(Query::ShowExecStatistics).await? {
            Response::ExecStatistics { stats } => Ok(stats),
            other => Self::reject(other),
        }
    }

    async fn query(&self, query: Query) -> Result<Response, ClientError> {
        self.send(&Request::Query { query }).await
    }

    fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

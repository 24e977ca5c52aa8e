//! Daemon lifecycle specs
//!
//! Verify daemon start/stop/status lifecycle, state file creation, and lock
//! contention behavior.

use crate::prelude::*;

#[test]
fn daemon_status_reports_not_running_before_start() {
    let env = Env::empty();

    env.afd()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("not running");
}

#[test]
fn daemon_start_reports_success() {
    let env = Env::empty();

    env.afd()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("started");
}

#[test]
fn daemon_status_shows_running_after_start() {
    let env = Env::empty();
    env.afd().args(&["daemon", "start"]).passes();

    env.afd()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("running");
}

#[test]
fn daemon_stop_reports_success() {
    let env = Env::empty();
    env.afd().args(&["daemon", "start"]).passes();

    env.afd()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("stopp");
}

#[test]
fn daemon_status_reports_not_running_after_stop() {
    let env = Env::empty();
    env.afd().args(&["daemon", "start"]).passes();
    env.afd().args(&["daemon", "stop"]).passes();

    env.afd()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("not running");
}

#[test]
fn daemon_creates_version_pid_and_socket_files() {
    let env = Env::empty();
    env.afd().args(&["daemon", "start"]).passes();

    let version_exists = wait_for(SPEC_WAIT_MAX_MS, || {
        env.state_path().join("afd.version").exists()
    });
    assert!(version_exists, "afd.version file should exist");

    let pid_exists = wait_for(SPEC_WAIT_MAX_MS, || {
        env.state_path().join("afd.pid").exists()
    });
    assert!(pid_exists, "afd.pid file should exist");

    let socket_exists = wait_for(SPEC_WAIT_MAX_MS, || {
        env.state_path().join("afd.sock").exists()
    });
    assert!(socket_exists, "afd.sock file should exist");
}

/// Running `afdd` directly when a daemon is already running must not
/// disrupt it.
///
/// Regression: a failed startup used to delete the socket and lock files
/// belonging to the running daemon, making it unreachable.
#[test]
fn running_afdd_while_daemon_running_does_not_kill_it() {
    let env = Env::empty();
    env.afd().args(&["daemon", "start"]).passes();
    env.afd()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("running");

    let afdd = afdd_binary();
    let output = std::process::Command::new(&afdd)
        .env("AFD_STATE_DIR", env.state_path())
        .output()
        .expect("afdd should run");
    assert!(
        !output.status.success(),
        "afdd should fail when a daemon is already running"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("already running"),
        "stderr should contain 'already running', got: {stderr}"
    );

    env.afd()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("running");
    assert!(
        env.state_path().join("afd.sock").exists(),
        "socket file must survive a rejected afdd launch"
    );
    assert!(
        env.state_path().join("afd.pid").exists(),
        "pid file must survive a rejected afdd launch"
    );
}

/// Running `afdd` twice in sequence (stop then start again) should work
/// normally; this verifies the lock file is released on clean exit.
#[test]
fn afdd_starts_again_after_previous_daemon_stopped() {
    let env = Env::empty();

    env.afd().args(&["daemon", "start"]).passes();
    env.afd().args(&["daemon", "stop"]).passes();

    env.afd().args(&["daemon", "start"]).passes();
    env.afd()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("running");
}

/// A daemon killed with SIGKILL mid-run should leave state recoverable:
/// a fresh `daemon start` against the same state directory should succeed
/// and pick the snapshot/WAL back up.
#[test]
fn daemon_recovers_state_after_a_crash() {
    let env = Env::empty();
    env.afd().args(&["daemon", "start"]).passes();

    let killed = env.daemon_kill();
    assert!(killed, "should be able to kill the daemon");

    let dead = wait_for(SPEC_WAIT_MAX_MS, || {
        !env.afd()
            .args(&["daemon", "status"])
            .passes()
            .stdout()
            .contains("afdd running")
    });
    assert!(dead, "daemon should be dead after SIGKILL");

    env.afd()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("started");
    env.afd()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("running");
}

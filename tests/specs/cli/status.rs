//! `afd status` specs.

use crate::prelude::*;

#[test]
fn status_reports_not_running_before_daemon_start() {
    let env = Env::empty();

    env.afd()
        .args(&["status"])
        .passes()
        .stdout_has("not running");
}

#[test]
fn status_reports_activity_counters_after_start() {
    let env = Env::empty();
    env.afd().args(&["daemon", "start"]).passes();

    env.afd()
        .args(&["status"])
        .passes()
        .stdout_has("hosts")
        .stdout_has("dirs")
        .stdout_has("pending jobs");
}

#[test]
fn status_json_output_is_well_formed() {
    let env = Env::empty();
    env.afd().args(&["daemon", "start"]).passes();

    let out = env
        .afd()
        .args(&["--output", "json", "status"])
        .passes();
    let stdout = out.stdout();
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("status --output json should be valid JSON");
    assert!(parsed.get("running").is_some());
}

#[test]
fn amg_toggle_round_trips() {
    let env = Env::empty();
    env.afd().args(&["daemon", "start"]).passes();

    env.afd().args(&["amg", "stop"]).passes();
    env.afd().args(&["amg", "start"]).passes();
}

#[test]
fn fd_toggle_round_trips() {
    let env = Env::empty();
    env.afd().args(&["daemon", "start"]).passes();

    env.afd().args(&["fd", "stop"]).passes();
    env.afd().args(&["fd", "start"]).passes();
}

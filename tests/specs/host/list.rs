//! Host listing and inspection specs.

use crate::prelude::*;

const ONE_HOST_CONFIG: &str = r#"
version = 1

[[hosts]]
host_id = 1
host_alias = "mirror1"
real_hostname = ["primary.example", ""]
protocol = 1
allowed_transfers = 2
max_errors = 5
host_status = 0
"#;

#[test]
fn host_list_is_empty_with_no_host_config() {
    let env = Env::empty();
    env.afd().args(&["daemon", "start"]).passes();

    let out = env.afd().args(&["host", "list"]).passes();
    out.stdout_lacks("mirror1");
}

#[test]
fn host_list_shows_a_configured_host() {
    let env = Env::empty();
    std::fs::write(env.state_path().join("host_config.toml"), ONE_HOST_CONFIG).unwrap();
    env.afd().args(&["daemon", "start"]).passes();

    env.afd()
        .args(&["host", "list"])
        .passes()
        .stdout_has("mirror1")
        .stdout_has("primary.example");
}

#[test]
fn host_show_reports_full_status_for_a_known_host() {
    let env = Env::empty();
    std::fs::write(env.state_path().join("host_config.toml"), ONE_HOST_CONFIG).unwrap();
    env.afd().args(&["daemon", "start"]).passes();

    env.afd()
        .args(&["host", "show", "mirror1"])
        .passes()
        .stdout_has("mirror1")
        .stdout_has("primary.example");
}

#[test]
fn host_disable_then_enable_round_trips() {
    let env = Env::empty();
    std::fs::write(env.state_path().join("host_config.toml"), ONE_HOST_CONFIG).unwrap();
    env.afd().args(&["daemon", "start"]).passes();

    env.afd().args(&["host", "disable", "mirror1"]).passes();
    env.afd().args(&["host", "enable", "mirror1"]).passes();
}

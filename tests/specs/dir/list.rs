//! Directory listing and inspection specs.

use crate::prelude::*;

const ONE_DIR_CONFIG: &str = r#"
version = 1

[[dirs]]
dir_id = 1
dir_alias = "outbound"
host_alias = "mirror1"
"#;

#[test]
fn dir_list_is_empty_with_no_dir_config() {
    let env = Env::empty();
    env.afd().args(&["daemon", "start"]).passes();

    env.afd()
        .args(&["dir", "list"])
        .passes()
        .stdout_lacks("outbound");
}

#[test]
fn dir_list_shows_a_configured_directory() {
    let env = Env::empty();
    std::fs::write(env.state_path().join("dir_config.toml"), ONE_DIR_CONFIG).unwrap();
    env.afd().args(&["daemon", "start"]).passes();

    env.afd()
        .args(&["dir", "list"])
        .passes()
        .stdout_has("outbound")
        .stdout_has("mirror1");
}

#[test]
fn dir_show_reports_full_status_for_a_known_directory() {
    let env = Env::empty();
    std::fs::write(env.state_path().join("dir_config.toml"), ONE_DIR_CONFIG).unwrap();
    env.afd().args(&["daemon", "start"]).passes();

    env.afd()
        .args(&["dir", "show", "outbound"])
        .passes()
        .stdout_has("outbound")
        .stdout_has("mirror1");
}

#[test]
fn dir_disable_then_enable_round_trips() {
    let env = Env::empty();
    std::fs::write(env.state_path().join("dir_config.toml"), ONE_DIR_CONFIG).unwrap();
    env.afd().args(&["daemon", "start"]).passes();

    env.afd().args(&["dir", "disable", "outbound"]).passes();
    env.afd().args(&["dir", "enable", "outbound"]).passes();
}

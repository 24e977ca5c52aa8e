// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

fn write(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write");
    path
}

#[test]
fn loads_well_formed_host_config() {
    let dir = tempdir().expect("tempdir");
    let path = write(
        &dir.path(),
        "hosts.toml",
        r#"
version = 1

[[hosts]]
host_id = 1
host_alias = "mirror1"
real_hostname = ["primary.example", ""]
protocol = 1
allowed_transfers = 2
max_errors = 5
host_status = 0
"#,
    );

    let hosts = load_host_config(&path).expect("load");
    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts[0].host_alias, "mirror1");
    assert_eq!(hosts[0].allowed_transfers, 2);
}

#[test]
fn rejects_unsupported_host_config_version() {
    let dir = tempdir().expect("tempdir");
    let path = write(&dir.path(), "hosts.toml", "version = 99\nhosts = []\n");

    let err = load_host_config(&path).expect_err("should fail");
    assert!(matches!(
        err,
        ConfigError::UnsupportedHostVersion {
            found: 99,
            expected: 1
        }
    ));
}

#[test]
fn rejects_duplicate_host_ids() {
    let dir = tempdir().expect("tempdir");
    let path = write(
        &dir.path(),
        "hosts.toml",
        r#"
version = 1

[[hosts]]
host_id = 1
host_alias = "a"
real_hostname = ["x", ""]
protocol = 1
allowed_transfers = 1
max_errors = 1
host_status = 0

[[hosts]]
host_id = 1
host_alias = "b"
real_hostname = ["y", ""]
protocol = 1
allowed_transfers = 1
max_errors = 1
host_status = 0
"#,
    );

    let err = load_host_config(&path).expect_err("should fail");
    assert!(matches!(err, ConfigError::DuplicateHostId(1)));
}

#[test]
fn rejects_malformed_toml() {
    let dir = tempdir().expect("tempdir");
    let path = write(&dir.path(), "hosts.toml", "not valid toml {{{");

    assert!(matches!(
        load_host_config(&path),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn loads_well_formed_dir_config() {
    let dir = tempdir().expect("tempdir");
    let path = write(
        &dir.path(),
        "dirs.toml",
        r#"
version = 1

[[dirs]]
dir_id = 1
dir_alias = "incoming"

[[dirs]]
dir_id = 2
dir_alias = "outgoing"
host_alias = "mirror1"
"#,
    );

    let dirs = load_dir_config(&path).expect("load");
    assert_eq!(dirs.len(), 2);
    assert_eq!(dirs[1].host_alias.as_deref(), Some("mirror1"));
}

#[test]
fn rejects_duplicate_dir_ids() {
    let dir = tempdir().expect("tempdir");
    let path = write(
        &dir.path(),
        "dirs.toml",
        r#"
version = 1

[[dirs]]
dir_id = 1
dir_alias = "a"

[[dirs]]
dir_id = 1
dir_alias = "b"
"#,
    );

    let err = load_dir_config(&path).expect_err("should fail");
    assert!(matches!(err, ConfigError::DuplicateDirId(1)));
}

#[test]
fn missing_file_surfaces_io_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("missing.toml");
    assert!(matches!(
        load_host_config(&path),
        Err(ConfigError::Io { .. })
    ));
}

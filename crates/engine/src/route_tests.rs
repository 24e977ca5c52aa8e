// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use afd_core::{DirId, HostId};
use std::io::Write;

fn write_toml(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn host_for_returns_none_for_unmapped_directory() {
    let table = RouteTable::new();
    assert_eq!(table.host_for(DirId::new(1)), None);
}

#[test]
fn insert_then_lookup_round_trips() {
    let mut table = RouteTable::new();
    table.insert(DirId::new(3), HostId::new(9));
    assert_eq!(table.host_for(DirId::new(3)), Some(HostId::new(9)));
}

#[test]
fn load_parses_well_formed_route_file() {
    let file = write_toml(
        r#"
        version = 1

        [[routes]]
        dir_id = 1
        host_id = 10

        [[routes]]
        dir_id = 2
        host_id = 20
        "#,
    );

    let table = RouteTable::load(file.path()).unwrap();
    assert_eq!(table.host_for(DirId::new(1)), Some(HostId::new(10)));
    assert_eq!(table.host_for(DirId::new(2)), Some(HostId::new(20)));
}

#[test]
fn load_rejects_unsupported_version() {
    let file = write_toml("version = 2\nroutes = []\n");
    let err = RouteTable::load(file.path()).unwrap_err();
    assert!(matches!(err, RouteError::UnsupportedVersion { found: 2, .. }));
}

#[test]
fn load_surfaces_io_error_for_missing_file() {
    let err = RouteTable::load(Path::new("/nonexistent/route.toml")).unwrap_err();
    assert!(matches!(err, RouteError::Io { .. }));
}

//! CLI help output specs
//!
//! Verify help text displays for the command tree.

use crate::prelude::*;

#[test]
fn afd_no_args_shows_usage_and_exits_nonzero() {
    cli().fails().stderr_has("Usage:");
}

#[test]
fn afd_help_shows_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn afd_host_help_shows_subcommands() {
    cli()
        .args(&["host", "--help"])
        .passes()
        .stdout_has("enable")
        .stdout_has("disable")
        .stdout_has("list");
}

#[test]
fn afd_dir_help_shows_subcommands() {
    cli()
        .args(&["dir", "--help"])
        .passes()
        .stdout_has("enable")
        .stdout_has("disable")
        .stdout_has("rescan");
}

#[test]
fn afd_daemon_help_shows_subcommands() {
    cli()
        .args(&["daemon", "--help"])
        .passes()
        .stdout_has("start")
        .stdout_has("stop")
        .stdout_has("status");
}

#[test]
fn afd_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.1");
}

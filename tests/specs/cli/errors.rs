//! CLI error handling specs
//!
//! Verify error messages for invalid commands and arguments.

use crate::prelude::*;

#[test]
fn unknown_subcommand_shows_error() {
    cli()
        .args(&["nonexistent"])
        .fails()
        .stderr_has("error:");
}

#[test]
fn host_show_missing_argument_shows_error() {
    cli().args(&["host", "show"]).fails().stderr_has("error:");
}

#[test]
fn host_show_unknown_alias_reports_not_found() {
    let env = Env::empty();
    env.afd().args(&["daemon", "start"]).passes();

    env.afd()
        .args(&["host", "show", "no-such-host"])
        .fails()
        .stderr_has("unknown host alias");
}

#[test]
fn dir_show_unknown_alias_reports_not_found() {
    let env = Env::empty();
    env.afd().args(&["daemon", "start"]).passes();

    env.afd()
        .args(&["dir", "show", "no-such-dir"])
        .fails()
        .stderr_has("unknown directory alias");
}

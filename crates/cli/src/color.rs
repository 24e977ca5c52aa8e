// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal color helpers shared by the table renderer and status output.

use std::io::IsTerminal;

const RESET: &str = "\x1b[0m";

/// Priority: `NO_COLOR=1` disables, `COLOR=1` forces, otherwise a TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Column headers: steel blue.
pub fn header(text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;74m{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Secondary/context text: darker grey.
pub fn muted(text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;240m{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Colorize a host/directory status string by its semantic meaning.
///
/// Matches the color names used by [`afd_core::host::StatusColor`]: green
/// for normal/active, yellow for warning, red for not-working/error, no
/// color for neutral/default/unknown.
pub fn status(text: &str) -> String {
    if !should_colorize() {
        return text.to_string();
    }
    let lower = text.trim().to_lowercase();
    let code = match lower.as_str() {
        "normal" | "active" | "ok" => "\x1b[32m",
        "warning" | "warn" => "\x1b[33m",
        "notworking" | "not_working" | "error" | "offline" => "\x1b[31m",
        _ => return text.to_string(),
    };
    format!("{code}{text}{RESET}")
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;

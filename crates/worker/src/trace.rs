// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The trace-stream line format mandated for protocol workers: a
//! protocol-contract surface external tools already parse, preserved
//! byte-for-byte rather than folded into the structured operational log.
//!
//! Format: `<DD HH:MM:SS> <sign> <hostname>[<N>]: <message> @<hex id> (<file> <line>)\n`

use afd_core::clock::Clock;
use chrono::{Datelike, TimeZone, Timelike, Utc};

/// `+` for progress/success lines, `-` for failure/warning lines, matching
/// the sign byte the original trace format carries per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceSign {
    Plus,
    Minus,
}

impl TraceSign {
    fn as_char(self) -> char {
        match self {
            TraceSign::Plus => '+',
            TraceSign::Minus => '-',
        }
    }
}

/// Replaces non-printable bytes with `.` before the line reaches any log
/// sink, so raw server responses can never corrupt the trace stream framing.
pub fn sanitize(raw: &[u8]) -> String {
    raw.iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        })
        .collect()
}

/// Splits a (possibly multi-line) server response on CR/LF boundaries so
/// each physical line is framed as its own trace record.
pub fn split_lines(raw: &[u8]) -> Vec<String> {
    sanitize(raw)
        .split(['\r', '\n'])
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Formats one trace-stream record per spec §4.5.
///
/// `job_slot` is the `[<N>]` job-slot index within the host; `id` is
/// rendered as lowercase hex; `source_file`/`source_line` identify the call
/// site the way the original inline-error-branching log noise did.
#[allow(clippy::too_many_arguments)]
pub fn format_trace_line(
    clock: &impl Clock,
    sign: TraceSign,
    hostname: &str,
    job_slot: u32,
    message: &str,
    id: u64,
    source_file: &str,
    source_line: u32,
) -> String {
    let millis = clock.epoch_ms();
    let secs = (millis / 1000) as i64;
    let dt = Utc.timestamp_opt(secs, 0).single().unwrap_or_else(Utc::now);

    format!(
        "<{:02} {:02}:{:02}:{:02}> {} {}[{}]: {} @{:x} ({} {})\n",
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        sign.as_char(),
        hostname,
        job_slot,
        message,
        id,
        source_file,
        source_line,
    )
}

#[cfg(test)]
#[path = "trace_tests.rs"]
mod tests;

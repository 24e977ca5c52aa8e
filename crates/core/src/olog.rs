// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output log line parsing for the resend/archive pipeline (spec §4.6
//! step 1, §6.4).
//!
//! A line is ASCII, `|`-free, fields separated by a single space
//! (`SEPARATOR_CHAR`), laid out as:
//!
//! `<date><SP><alias><SP><type-token><SP><SP><filename>[<SP><remote-filename>]<SP><size><SP><duration>[<SP><retries>]<SP><job_id><SP><unique-string><SP><archive-dir>`
//!
//! Column widths for `date` and `alias` are fixed; the protocol type
//! token is 1, 3, or 5 characters, detected by inspecting the bytes
//! immediately after the alias column (spec REDESIGN FLAGS notes the
//! original's `ACTIVATE_THIS_AFTER_VERSION_14` guard straddles two
//! on-disk formats — both are supported here, see DESIGN.md).

use crate::ids::JobId;
use thiserror::Error;

pub const SEPARATOR_CHAR: char = ' ';
pub const DATE_FIELD_WIDTH: usize = 14;
pub const ALIAS_FIELD_WIDTH: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OlogParseError {
    #[error("line shorter than the fixed date+alias prefix")]
    TooShort,
    #[error("missing separator after the type token")]
    MissingTypeTokenSeparator,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid integer field {0:?}: {1}")]
    InvalidInt(String, std::num::ParseIntError),
}

/// One parsed output-log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OlogEntry {
    pub date: String,
    pub alias: String,
    pub type_token: String,
    pub filename: String,
    pub remote_filename: Option<String>,
    pub size: u64,
    pub duration: String,
    pub retries: Option<u32>,
    pub job_id: JobId,
    pub unique_string: String,
    pub archive_dir: String,
}

/// Escape a filename for embedding in a space-separated log line: literal
/// spaces become `\ ` (spec §6.4, §4.6 step 1).
pub fn escape_filename(name: &str) -> String {
    name.replace('\\', "\\\\").replace(' ', "\\ ")
}

/// Inverse of [`escape_filename`].
pub fn unescape_filename(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                out.push(next);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Split a line on unescaped `SEPARATOR_CHAR`, keeping `\ ` sequences
/// joined to the token that contains them.
fn split_escaped(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            current.push('\\');
            if let Some(&next) = chars.peek() {
                current.push(next);
                chars.next();
            }
            continue;
        }
        if c == SEPARATOR_CHAR {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(c);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Detect the protocol type-token width by finding which of the three
/// candidate offsets (1, 3, 5) holds the separator that terminates the
/// token, per spec §4.6 step 1.
fn detect_type_token_width(after_alias: &str) -> usize {
    let bytes = after_alias.as_bytes();
    if bytes.len() > 1 && bytes[1] == SEPARATOR_CHAR as u8 {
        1
    } else if bytes.len() > 3 && bytes[3] == SEPARATOR_CHAR as u8 {
        3
    } else {
        5
    }
}

impl OlogEntry {
    pub fn parse(line: &str) -> Result<Self, OlogParseError> {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.len() < DATE_FIELD_WIDTH + 1 + ALIAS_FIELD_WIDTH + 1 {
            return Err(OlogParseError::TooShort);
        }

        let date = line[..DATE_FIELD_WIDTH].to_string();
        let rest = &line[DATE_FIELD_WIDTH + 1..];
        let alias = rest[..ALIAS_FIELD_WIDTH].trim_end().to_string();
        let after_alias = &rest[ALIAS_FIELD_WIDTH + 1..];

        let width = detect_type_token_width(after_alias);
        if after_alias.len() <= width || after_alias.as_bytes()[width] != SEPARATOR_CHAR as u8 {
            return Err(OlogParseError::MissingTypeTokenSeparator);
        }
        let type_token = after_alias[..width].to_string();
        // Two spaces precede the filename (one already consumed above).
        let tail = after_alias[width..].trim_start_matches(SEPARATOR_CHAR);

        let fields = split_escaped(tail);
        let mut it = fields.into_iter();

        let filename = unescape_filename(
            &it.next()
                .ok_or(OlogParseError::MissingField("filename"))?,
        );

        // Remaining mandatory trailing fields, right-aligned: size,
        // duration, job_id, unique_string, archive_dir, with an optional
        // remote_filename right after filename and an optional retries
        // field right before job_id.
        let remaining: Vec<String> = it.collect();
        if remaining.len() < 4 {
            return Err(OlogParseError::MissingField("size/duration/job_id/unique/archive"));
        }

        // archive_dir and unique_string and job_id are the last three
        // fields; duration is the one before whatever retries/size
        // occupy.
        let n = remaining.len();
        let archive_dir = remaining[n - 1].clone();
        let unique_string = remaining[n - 2].clone();
        let job_id_str = &remaining[n - 3];
        let job_id = job_id_str
            .parse::<u32>()
            .map(JobId::new)
            .map_err(|e| OlogParseError::InvalidInt(job_id_str.clone(), e))?;

        // What's left before job_id is: [remote_filename?] size duration [retries?]
        let head = &remaining[..n - 3];
        let (remote_filename, size_str, duration, retries) = match head.len() {
            2 => (None, &head[0], head[1].clone(), None),
            3 => {
                // Ambiguous between "remote size duration" and "size duration
                // retries": prefer the latter only when both the size and
                // retries positions are plausible integers.
                if head[0].parse::<u64>().is_ok() && head[2].parse::<u32>().is_ok() {
                    (None, &head[0], head[1].clone(), head[2].parse::<u32>().ok())
                } else {
                    (Some(head[0].clone()), &head[1], head[2].clone(), None)
                }
            }
            4 => (
                Some(head[0].clone()),
                &head[1],
                head[2].clone(),
                head[3].parse::<u32>().ok(),
            ),
            _ => return Err(OlogParseError::MissingField("size/duration")),
        };

        let size = size_str
            .parse::<u64>()
            .map_err(|e| OlogParseError::InvalidInt(size_str.clone(), e))?;

        Ok(OlogEntry {
            date,
            alias,
            type_token,
            filename,
            remote_filename,
            size,
            duration,
            retries,
            job_id,
            unique_string,
            archive_dir,
        })
    }

    /// Render back to the on-disk line format (used by tests and by
    /// anything writing fresh log lines).
    pub fn render(&self) -> String {
        let mut out = format!(
            "{:<width1$} {:<width2$} {}  {}",
            self.date,
            self.alias,
            self.type_token,
            escape_filename(&self.filename),
            width1 = DATE_FIELD_WIDTH,
            width2 = ALIAS_FIELD_WIDTH,
        );
        if let Some(remote) = &self.remote_filename {
            out.push(' ');
            out.push_str(remote);
        }
        out.push(' ');
        out.push_str(&self.size.to_string());
        out.push(' ');
        out.push_str(&self.duration);
        if let Some(retries) = self.retries {
            out.push(' ');
            out.push_str(&retries.to_string());
        }
        out.push(' ');
        out.push_str(&self.job_id.to_string());
        out.push(' ');
        out.push_str(&self.unique_string);
        out.push(' ');
        out.push_str(&self.archive_dir);
        out
    }

    /// Reconstruct the archive path for this entry: `<archive_dir>/<unique_string>/<filename>`
    /// (spec §4.6 step 1). Escaping round-trips (property R3): the
    /// filename recovered here is byte-identical to the one in the
    /// original `link()`/`copy()` source path.
    pub fn archive_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.archive_dir)
            .join(&self.unique_string)
            .join(&self.filename)
    }
}

#[cfg(test)]
#[path = "olog_tests.rs"]
mod tests;

// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Line-based parsing for exported chat transcripts.
//!
//! Chat exports are plain text. Every message starts with a header line of
//! the form:
//!
//! ```text
//! [D/M/YYYY, H:MM:SS] Name: Message
//! ```
//!
//! Any line that does not look like a header belongs to the message above it
//! (multi-line messages). Lines that appear before the first header cannot be
//! attributed to anybody and are dropped.
//!
//! # Example
//!
//! ```
//! use chat2html::parser::parse_transcript;
//!
//! let text = "\
//! [01/02/2023, 09:15:00] Alice: Hello there
//! how are you?
//! [01/02/2023, 09:16:00] Bob: I am fine";
//!
//! let transcript = parse_transcript(text).unwrap();
//! assert_eq!(transcript.len(), 2);
//! assert_eq!(transcript.messages[0].content, "Hello there\nhow are you?");
//! assert_eq!(transcript.participants(), ["Alice", "Bob"]);
//! ```

use chrono::{NaiveDateTime, Timelike};
use regex::Regex;
use serde::Serialize;
use snafu::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Error type for transcript parsing failures.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// The transcript file could not be read.
    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        /// Path of the transcript file.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// A header line carried a date or time that is not a real calendar value.
    #[snafu(display("invalid timestamp {raw:?} on line {line}: {source}"))]
    InvalidTimestamp {
        /// 1-based line number of the offending header.
        line: usize,
        /// The date and time text as it appeared in the header.
        raw: String,
        /// The underlying chrono error.
        source: chrono::ParseError,
    },

    /// A header line carried second `60`, which chrono would read as a leap
    /// second.
    #[snafu(display("invalid timestamp {raw:?} on line {line}: second out of range"))]
    SecondOutOfRange {
        /// 1-based line number of the offending header.
        line: usize,
        /// The date and time text as it appeared in the header.
        raw: String,
    },
}

/// Substrings that mark a message as a group event rather than something a
/// participant wrote. Matched case-insensitively against the first line of
/// content.
///
/// This is a heuristic: a genuine message such as "I left my keys at home"
/// is also flagged.
pub const SYSTEM_MARKERS: &[&str] = &[
    "Messages and calls are end-to-end encrypted",
    "created group",
    "added",
    "left",
    "removed",
    "changed the subject",
    "changed this group's icon",
    "changed their phone number",
    "joined using this group's invite link",
];

/// Number of lines between two progress notifications.
pub const PROGRESS_INTERVAL: usize = 100;

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(\d{1,2}/\d{1,2}/\d{4}),\s(\d{1,2}:\d{2}:\d{2})\]\s([^:]+):\s(.+)")
        .expect("header pattern is valid")
});

/// A single message from the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// When the message was sent (local time of the export, no timezone).
    pub timestamp: NaiveDateTime,

    /// Display name of the author, exactly as exported.
    pub sender: String,

    /// Message text. Continuation lines are joined with `\n`.
    pub content: String,

    /// Whether this looks like a group event (see [`SYSTEM_MARKERS`]).
    ///
    /// Decided once from the first line of content.
    pub is_system: bool,
}

impl Message {
    fn new(timestamp: NaiveDateTime, sender: &str, content: &str) -> Self {
        let content = content.trim();
        Self {
            timestamp,
            sender: sender.trim().to_owned(),
            content: content.to_owned(),
            is_system: is_system_message(content),
        }
    }
}

/// The ordered messages of one transcript.
///
/// Summaries are recomputed from `messages` on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    /// Messages in file order.
    pub messages: Vec<Message>,
}

impl Transcript {
    /// Number of messages of any kind.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if no header line was found.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Distinct senders of non-system messages, sorted lexicographically.
    #[must_use]
    pub fn participants(&self) -> Vec<String> {
        self.messages
            .iter()
            .filter(|m| !m.is_system)
            .map(|m| m.sender.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Number of non-system messages.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.iter().filter(|m| !m.is_system).count()
    }

    /// Earliest and latest timestamp over all messages, system ones included.
    ///
    /// Both are `None` for an empty transcript.
    #[must_use]
    pub fn date_range(&self) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
        let timestamps = self.messages.iter().map(|m| m.timestamp);
        (timestamps.clone().min(), timestamps.max())
    }
}

/// Receives `(lines_processed, total_lines)` while a transcript is parsed.
///
/// Notifications never influence the parse result.
pub trait ProgressObserver {
    /// Called every [`PROGRESS_INTERVAL`] lines and once when parsing ends.
    fn on_progress(&mut self, processed: usize, total: usize);
}

impl<F> ProgressObserver for F
where
    F: FnMut(usize, usize),
{
    fn on_progress(&mut self, processed: usize, total: usize) {
        self(processed, total);
    }
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _processed: usize, _total: usize) {}
}

/// Returns `true` if `content` contains any of the [`SYSTEM_MARKERS`],
/// ignoring case.
#[must_use]
pub fn is_system_message(content: &str) -> bool {
    let content = content.to_lowercase();
    SYSTEM_MARKERS
        .iter()
        .any(|marker| content.contains(&marker.to_lowercase()))
}

/// Reads and parses the transcript at `path`.
///
/// # Errors
///
/// Returns [`ParseError::ReadFile`] if the file cannot be read, and
/// [`ParseError::InvalidTimestamp`] or [`ParseError::SecondOutOfRange`] if a
/// header carries an impossible date or time.
pub fn parse_file(path: &Path) -> Result<Transcript, ParseError> {
    parse_file_with_progress(path, &mut NoProgress)
}

/// Like [`parse_file`], reporting progress to `observer`.
///
/// # Errors
///
/// See [`parse_file`].
pub fn parse_file_with_progress(
    path: &Path,
    observer: &mut impl ProgressObserver,
) -> Result<Transcript, ParseError> {
    let text = std::fs::read_to_string(path).context(ReadFileSnafu { path })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "read transcript");
    parse_transcript_with_progress(&text, observer)
}

/// Parses transcript text that is already in memory.
///
/// # Errors
///
/// Returns [`ParseError::InvalidTimestamp`] or
/// [`ParseError::SecondOutOfRange`] if a header carries an impossible date or
/// time. Nothing is returned for the rest of the text.
pub fn parse_transcript(text: &str) -> Result<Transcript, ParseError> {
    parse_transcript_with_progress(text, &mut NoProgress)
}

/// Like [`parse_transcript`], reporting progress to `observer`.
///
/// # Errors
///
/// See [`parse_transcript`].
pub fn parse_transcript_with_progress(
    text: &str,
    observer: &mut impl ProgressObserver,
) -> Result<Transcript, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let total = lines.len();

    let mut messages = Vec::new();
    let mut current: Option<Message> = None;
    let mut dropped = 0usize;

    for (idx, line) in lines.iter().enumerate() {
        let line_number = idx + 1;

        if let Some(caps) = HEADER.captures(line) {
            if let Some(done) = current.take() {
                finalize(&mut messages, done);
            }

            let timestamp = parse_timestamp(line_number, &caps[1], &caps[2])?;
            current = Some(Message::new(timestamp, &caps[3], &caps[4]));
        } else if let Some(message) = current.as_mut() {
            message.content.push('\n');
            message.content.push_str(line);
        } else {
            dropped += 1;
            tracing::debug!(line = line_number, "dropping line before first message");
        }

        if line_number % PROGRESS_INTERVAL == 0 {
            observer.on_progress(line_number, total);
        }
    }

    if let Some(done) = current {
        finalize(&mut messages, done);
    }
    observer.on_progress(total, total);

    tracing::debug!(
        lines = total,
        messages = messages.len(),
        dropped,
        "parsed transcript"
    );

    Ok(Transcript { messages })
}

/// Builds the timestamp of a header from its date and time captures.
fn parse_timestamp(line: usize, date: &str, time: &str) -> Result<NaiveDateTime, ParseError> {
    let raw = format!("{date} {time}");
    let timestamp = NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
        .context(InvalidTimestampSnafu {
            line,
            raw: raw.clone(),
        })?;

    // chrono encodes a leap second as an overflowing nanosecond field
    ensure!(
        timestamp.nanosecond() < 1_000_000_000,
        SecondOutOfRangeSnafu { line, raw }
    );
    Ok(timestamp)
}

fn finalize(messages: &mut Vec<Message>, message: Message) {
    tracing::debug!(
        index = messages.len(),
        sender = %message.sender,
        timestamp = %message.timestamp,
        system = message.is_system,
        "finalized message"
    );
    messages.push(message);
}

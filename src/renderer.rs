// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! HTML rendering for parsed chat transcripts.
//!
//! This module turns a [`Transcript`] into a single self-contained HTML page
//! styled like a phone chat: coloured bubbles, one side for the first
//! participant and the other side for everybody else, and centred notices for
//! group events. The embedded stylesheet carries `@page` rules so the page
//! prints as a paginated A4 document.
//!
//! # Output Format
//!
//! The rendered page includes:
//! - A header with the title, participants, message count, and date range
//! - A date separator whenever the calendar day changes
//! - One bubble per message with sender name (incoming side only) and time
//!
//! # Example
//!
//! ```
//! use chat2html::parser::parse_transcript;
//! use chat2html::renderer::{render_html, RenderOptions};
//!
//! let transcript = parse_transcript(
//!     "[01/02/2023, 09:15:00] Alice: Hello!\n[01/02/2023, 09:16:00] Bob: Hi <3",
//! )
//! .unwrap();
//!
//! let html = render_html(&transcript, &RenderOptions::default());
//!
//! assert!(html.starts_with("<!DOCTYPE html>"));
//! assert!(html.contains("Hello!"));
//! assert!(html.contains("Hi &lt;3"));
//! ```

use crate::parser::{Message, Transcript};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use snafu::prelude::*;
use std::collections::HashMap;
use std::fmt::Write;

const STYLESHEET: &str = include_str!("../assets/chat.css");

/// Number of distinct name colours in the stylesheet.
pub const SENDER_COLORS: usize = 8;

const DEFAULT_TITLE: &str = "Chat transcript";

/// Error type for rendering failures.
#[derive(Debug, Snafu)]
pub enum RenderError {
    /// Failed to serialize the preview document.
    #[snafu(display("failed to serialize preview: {source}"))]
    Serialize {
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// Configuration options for HTML rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Heading shown at the top of the page.
    ///
    /// Falls back to "Chat transcript" when unset.
    pub title: Option<String>,

    /// Participants in display order.
    ///
    /// The first name is drawn on the outgoing side. When empty, the order
    /// is taken from the first message of each sender.
    pub participants: Vec<String>,
}

/// Stable display index for each participant name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderIndex {
    order: Vec<String>,
    indices: HashMap<String, usize>,
}

impl SenderIndex {
    /// Assigns indices in the order the names are given. Repeated names keep
    /// their first index.
    #[must_use]
    pub fn from_participants<S: AsRef<str>>(names: &[S]) -> Self {
        let mut index = Self::default();
        for name in names {
            index.insert(name.as_ref());
        }
        index
    }

    /// Assigns indices in order of each sender's first non-system message.
    #[must_use]
    pub fn auto_detect(messages: &[Message]) -> Self {
        let mut index = Self::default();
        for msg in messages.iter().filter(|m| !m.is_system) {
            index.insert(&msg.sender);
        }
        index
    }

    /// Uses `participants` when given, otherwise detects from `messages`.
    #[must_use]
    pub fn build<S: AsRef<str>>(messages: &[Message], participants: &[S]) -> Self {
        if participants.is_empty() {
            Self::auto_detect(messages)
        } else {
            Self::from_participants(participants)
        }
    }

    fn insert(&mut self, name: &str) {
        if !self.indices.contains_key(name) {
            self.indices.insert(name.to_owned(), self.order.len());
            self.order.push(name.to_owned());
        }
    }

    /// Returns the display index of `sender`, if it has one.
    #[must_use]
    pub fn index_of(&self, sender: &str) -> Option<usize> {
        self.indices.get(sender).copied()
    }

    /// Names in index order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.order
    }
}

/// How a single message bubble is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleStyle {
    /// A centred group event notice.
    System,

    /// The right-hand side, used for the participant with index 0.
    Outgoing,

    /// The left-hand side.
    Incoming {
        /// Name colour slot, or `None` for senders without an index.
        color: Option<usize>,
    },
}

impl BubbleStyle {
    /// Picks the style of `msg` from its sender's display index.
    #[must_use]
    pub fn for_message(msg: &Message, senders: &SenderIndex) -> Self {
        if msg.is_system {
            return Self::System;
        }
        match senders.index_of(&msg.sender) {
            Some(0) => Self::Outgoing,
            Some(idx) => Self::Incoming {
                color: Some(idx % SENDER_COLORS),
            },
            None => Self::Incoming { color: None },
        }
    }

    fn css_class(self) -> String {
        match self {
            Self::System => "message system".to_owned(),
            Self::Outgoing => "message outgoing sender-0".to_owned(),
            Self::Incoming { color: Some(c) } => format!("message incoming sender-{c}"),
            Self::Incoming { color: None } => "message incoming".to_owned(),
        }
    }
}

/// Renders a parsed transcript as a complete HTML page.
#[must_use]
pub fn render_html(transcript: &Transcript, opts: &RenderOptions) -> String {
    let senders = SenderIndex::build(&transcript.messages, &opts.participants);
    let title = opts.title.as_deref().unwrap_or(DEFAULT_TITLE);

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    writeln!(out, "<title>{}</title>", escape_html(title)).unwrap();
    writeln!(out, "<style>\n{STYLESHEET}</style>\n</head>\n<body>").unwrap();

    render_header(&mut out, transcript, &senders, title);

    out.push_str("<main class=\"chat\">\n");
    let mut current_day: Option<NaiveDate> = None;
    for msg in &transcript.messages {
        let day = msg.timestamp.date();
        if current_day != Some(day) {
            writeln!(
                out,
                "<div class=\"date-separator\"><span>{}</span></div>",
                day.format("%d/%m/%Y")
            )
            .unwrap();
            current_day = Some(day);
        }
        render_message(&mut out, msg, &senders);
    }
    out.push_str("</main>\n</body>\n</html>\n");

    out
}

fn render_header(out: &mut String, transcript: &Transcript, senders: &SenderIndex, title: &str) {
    out.push_str("<header class=\"chat-header\">\n");
    writeln!(out, "<h1>{}</h1>", escape_html(title)).unwrap();

    if !senders.names().is_empty() {
        let names: Vec<String> = senders
            .names()
            .iter()
            .map(String::as_str)
            .map(escape_html)
            .collect();
        writeln!(out, "<p class=\"participants\">{}</p>", names.join(", ")).unwrap();
    }

    let count = transcript.message_count();
    let noun = if count == 1 { "message" } else { "messages" };
    match transcript.date_range() {
        (Some(start), Some(end)) => writeln!(
            out,
            "<p class=\"meta\">{count} {noun} &middot; {}</p>",
            format_date_range(start, end)
        )
        .unwrap(),
        _ => writeln!(out, "<p class=\"meta\">{count} {noun}</p>").unwrap(),
    }

    out.push_str("</header>\n");
}

fn render_message(out: &mut String, msg: &Message, senders: &SenderIndex) {
    let style = BubbleStyle::for_message(msg, senders);
    writeln!(out, "<div class=\"{}\">", style.css_class()).unwrap();
    out.push_str("<div class=\"bubble\">");

    if matches!(style, BubbleStyle::Incoming { .. }) {
        write!(
            out,
            "<div class=\"sender\">{}</div>",
            escape_html(&msg.sender)
        )
        .unwrap();
    }

    write!(
        out,
        "<div class=\"content\">{}</div>",
        escape_html(&msg.content).replace('\n', "<br>\n")
    )
    .unwrap();

    if style != BubbleStyle::System {
        write!(
            out,
            "<span class=\"time\">{}</span>",
            msg.timestamp.format("%H:%M")
        )
        .unwrap();
    }

    out.push_str("</div>\n</div>\n");
}

/// Formats a date range as `01 February 2023 - 03 March 2023`.
#[must_use]
pub fn format_date_range(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!("{} - {}", start.format("%d %B %Y"), end.format("%d %B %Y"))
}

#[derive(Serialize)]
struct DateRange {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
}

#[derive(Serialize)]
struct Preview<'a> {
    participants: Vec<String>,
    message_count: usize,
    date_range: DateRange,
    messages: &'a [Message],
}

/// Renders the parsed transcript and its summaries as pretty-printed JSON.
///
/// This is the intermediate form the HTML page is built from, useful for
/// checking what the parser recognised.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_preview(transcript: &Transcript) -> Result<String, RenderError> {
    let (start, end) = transcript.date_range();
    let preview = Preview {
        participants: transcript.participants(),
        message_count: transcript.message_count(),
        date_range: DateRange { start, end },
        messages: &transcript.messages,
    };
    serde_json::to_string_pretty(&preview).context(SerializeSnafu)
}

/// Escapes the characters HTML treats as markup.
fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

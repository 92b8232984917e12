// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Convert exported chat transcripts to chat-styled HTML documents.
//!
//! This crate provides parsing and rendering functionality for transforming
//! plain-text chat exports into a printable page that looks like the chat it
//! came from.
//!
//! # Overview
//!
//! Chat apps export conversations as text, one header line per message with
//! continuation lines for multi-line messages. This crate:
//!
//! 1. Parses the text into ordered [`parser::Message`] records
//! 2. Renders them as an HTML page, or as a JSON preview of the parse
//!
//! # Example
//!
//! ```no_run
//! use chat2html::{parser, renderer};
//! use std::path::Path;
//!
//! let transcript = parser::parse_file(Path::new("chat.txt")).unwrap();
//!
//! let opts = renderer::RenderOptions {
//!     title: Some("Family".into()),
//!     ..Default::default()
//! };
//!
//! let html = renderer::render_html(&transcript, &opts);
//! std::fs::write("chat.html", html).unwrap();
//! ```
//!
//! # Modules
//!
//! - [`parser`]: transcript parsing, message records, and summaries
//! - [`renderer`]: HTML page and JSON preview generation

#![deny(missing_docs)]

pub mod parser;
pub mod renderer;

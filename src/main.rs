// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for chat2html.
//!
//! This binary provides the `chat2html` command for converting exported chat
//! transcripts into chat-styled HTML pages.

use chat2html::{parser, renderer};
use lexopt::prelude::*;
use snafu::{ensure, prelude::*};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

struct Cli {
    input: PathBuf,
    output: Option<PathBuf>,
    preview: bool,
    title: Option<String>,
    participants: Vec<String>,
    quiet: bool,
    verbose: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("input file {} not found", path.display()))]
    InputNotFound { path: PathBuf },

    #[snafu(display("failed to parse {}: {source}", path.display()))]
    ParseFile {
        path: PathBuf,
        source: parser::ParseError,
    },

    #[snafu(display("no messages found in {}", path.display()))]
    NoMessages { path: PathBuf },

    #[snafu(display("failed to render preview: {source}"))]
    RenderPreview { source: renderer::RenderError },

    #[snafu(display("failed to create output directory: {source}"))]
    CreateOutputDir { source: std::io::Error },

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn print_help() {
    println!(
        "\
{name} {version}
Convert exported chat transcripts to chat-styled HTML

Usage: {name} [OPTIONS] <INPUT>

Arguments:
  <INPUT>  Exported chat transcript (.txt)

Options:
  -o, --output <OUTPUT>     Output HTML file (default: input with .html extension)
      --preview             Also write the parsed transcript as JSON next to the output
  -t, --title <TITLE>       Page heading (default: \"Chat transcript\")
  -p, --participant <NAME>  Pin participant display order; repeat for each name.
                            The first name is drawn on the outgoing side.

Other options:
  -q, --quiet               Suppress progress messages
  -v, --verbose             Enable debug logging (RUST_LOG overrides)
  -h, --help                Print help
  -V, --version             Print version",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    // Show help if no arguments provided
    if std::env::args().len() == 1 {
        print_help();
        std::process::exit(0);
    }

    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut preview = false;
    let mut title: Option<String> = None;
    let mut participants = Vec::new();
    let mut quiet = false;
    let mut verbose = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('o') | Long("output") => output = Some(parser.value()?.parse()?),
            Long("preview") => preview = true,
            Short('t') | Long("title") => title = Some(parser.value()?.string()?),
            Short('p') | Long("participant") => participants.push(parser.value()?.string()?),
            Short('q') | Long("quiet") => quiet = true,
            Short('v') | Long("verbose") => verbose = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) if input.is_none() => input = Some(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Cli {
        input: input.ok_or("missing required argument: <INPUT>")?,
        output,
        preview,
        title,
        participants,
        quiet,
        verbose,
    })
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;
    init_logging(cli.verbose);

    ensure!(
        cli.input.is_file(),
        InputNotFoundSnafu { path: &cli.input }
    );

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("html"));

    let transcript = parse_input(&cli)?;
    ensure!(
        !transcript.is_empty(),
        NoMessagesSnafu { path: &cli.input }
    );

    if !cli.quiet {
        eprintln!(
            "Found {} messages from {} participants",
            transcript.message_count(),
            transcript.participants().len()
        );
        if let (Some(start), Some(end)) = transcript.date_range() {
            eprintln!("Date range: {}", renderer::format_date_range(start, end));
        }
    }

    let opts = make_render_options(&cli);
    let html = renderer::render_html(&transcript, &opts);
    write_output(&output, &html)?;
    if !cli.quiet {
        eprintln!("Wrote {}", output.display());
    }

    if cli.preview {
        let preview_path = output.with_extension("json");
        let json = renderer::render_preview(&transcript).context(RenderPreviewSnafu)?;
        write_output(&preview_path, &json)?;
        if !cli.quiet {
            eprintln!("Wrote {}", preview_path.display());
        }
    }

    Ok(())
}

/// Parses the input transcript, printing line progress unless quiet.
fn parse_input(cli: &Cli) -> Result<parser::Transcript, Error> {
    let path = cli.input.as_path();

    if cli.quiet {
        return parser::parse_file(path).context(ParseFileSnafu { path });
    }

    eprintln!("Parsing {}", path.display());
    let mut report = |done: usize, total: usize| eprint!("\r  {done}/{total} lines");
    let transcript = parser::parse_file_with_progress(path, &mut report);
    eprintln!();
    transcript.context(ParseFileSnafu { path })
}

/// Creates render options from CLI arguments.
fn make_render_options(cli: &Cli) -> renderer::RenderOptions {
    renderer::RenderOptions {
        title: cli.title.clone(),
        participants: cli.participants.clone(),
    }
}

fn write_output(path: &Path, contents: &str) -> Result<(), Error> {
    // Create parent directory if needed
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context(CreateOutputDirSnafu)?;
    }
    std::fs::write(path, contents).context(WriteFileSnafu { path })
}

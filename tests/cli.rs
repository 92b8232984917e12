// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! End-to-end tests for the chat2html binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const CHAT: &str = "\
[01/02/2023, 09:15:00] Alice: Hello there
how are you?
[01/02/2023, 09:16:00] Bob: I am fine
";

fn write_transcript(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).expect("Failed to write transcript");
    path
}

fn run(input: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chat2html"))
        .arg("--quiet")
        .arg(input)
        .output()
        .expect("Failed to run chat2html")
}

/// Tests that a valid transcript converts next to the input by default.
#[test]
fn writes_html_next_to_input() {
    let dir = TempDir::new().unwrap();
    let input = write_transcript(&dir, "chat.txt", CHAT);

    let out = run(&input);

    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let html = fs::read_to_string(dir.path().join("chat.html")).expect("Missing chat.html");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Hello there<br>\nhow are you?"));
    assert!(!dir.path().join("chat.json").exists());
}

/// Tests that --output and --preview write both artifacts.
#[test]
fn preview_written_beside_output() {
    let dir = TempDir::new().unwrap();
    let input = write_transcript(&dir, "chat.txt", CHAT);
    let output = dir.path().join("out").join("page.html");

    let out = Command::new(env!("CARGO_BIN_EXE_chat2html"))
        .arg("-q")
        .arg("--preview")
        .arg("-o")
        .arg(&output)
        .arg(&input)
        .output()
        .expect("Failed to run chat2html");

    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(output.exists(), "HTML output should be written");

    let json = fs::read_to_string(dir.path().join("out").join("page.json"))
        .expect("Missing preview JSON");
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["message_count"], 2);
    assert_eq!(value["participants"], serde_json::json!(["Alice", "Bob"]));
    assert!(!dir.path().join("chat.html").exists());
}

/// Tests that a missing input file exits with status 1.
#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("nope.txt");

    let out = run(&input);

    assert_eq!(out.status.code(), Some(1));
    assert!(!dir.path().join("nope.html").exists());
}

/// Tests that a transcript without any header line exits with status 1.
#[test]
fn transcript_without_messages_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_transcript(&dir, "notes.txt", "just some text\nnothing else\n");

    let out = run(&input);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("NoMessages"));
    assert!(!dir.path().join("notes.html").exists());
}

/// Tests that an impossible date aborts the conversion with status 1.
#[test]
fn malformed_timestamp_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_transcript(
        &dir,
        "chat.txt",
        "[01/02/2023, 09:15:00] Alice: ok\n[32/02/2023, 09:16:00] Bob: bad\n",
    );

    let out = run(&input);

    assert_eq!(out.status.code(), Some(1));
    assert!(!dir.path().join("chat.html").exists());
}

/// Tests that second 60 aborts the conversion with status 1.
#[test]
fn second_sixty_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_transcript(&dir, "chat.txt", "[01/02/2023, 09:15:60] Alice: hi\n");

    let out = run(&input);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("SecondOutOfRange"));
}

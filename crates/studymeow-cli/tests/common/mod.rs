//! Common utilities for CLI E2E tests.
//!
//! Every [`Home`] points `HOME` at its own temp directory, so tests never
//! share a database or config file.

#![allow(dead_code)]

use std::process::Command;

pub struct Home {
    dir: tempfile::TempDir,
}

impl Home {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp home"),
        }
    }

    /// Invoke a CLI command and return (stdout, stderr, exit code).
    pub fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_studymeow"))
            .args(args)
            .env("HOME", self.dir.path())
            .env_remove("STUDYMEOW_ENV")
            .env_remove("STUDYMEOW_LOG")
            .output()
            .expect("Failed to execute CLI command");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);

        (stdout, stderr, code)
    }

    /// Invoke a CLI command and expect success.
    pub fn success(&self, args: &[&str]) -> String {
        let (stdout, stderr, code) = self.run(args);
        if code != 0 && !stderr.is_empty() {
            eprintln!("CLI error output: {}", stderr);
        }
        assert_eq!(code, 0, "CLI command failed with code {}: {:?}", code, args);
        stdout
    }

    /// Invoke a CLI command and expect failure; returns stderr.
    pub fn failure(&self, args: &[&str]) -> String {
        let (_, stderr, code) = self.run(args);
        assert!(code != 0, "CLI command unexpectedly succeeded: {:?}", args);
        stderr
    }

    /// Invoke a command whose whole stdout is one JSON document.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        parse_json(&self.success(args))
    }
}

/// Parse JSON output from CLI.
pub fn parse_json<T: for<'de> serde::Deserialize<'de>>(json: &str) -> T {
    serde_json::from_str(json).expect("Failed to parse JSON output")
}

/// Check if string contains substring
pub fn assert_contains(haystack: &str, needle: &str) {
    assert!(
        haystack.contains(needle),
        "Expected '{}' to contain '{}'",
        haystack, needle
    );
}

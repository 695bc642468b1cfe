use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test harness for running CLI commands with temporary databases
pub struct CliTestHarness {
    temp_dir: TempDir,
    db_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with a temporary database
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        Self { temp_dir, db_path }
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("tasknote").expect("Failed to find tasknote binary");

        // Run inside the temp dir so no stray tasknote.toml is picked up
        cmd.current_dir(self.temp_dir.path());
        cmd.env("TASKNOTE_DATABASE_PATH", &self.db_path);
        cmd.env_remove("TASKNOTE_OWNER");
        cmd.env_remove("RUST_LOG");

        cmd
    }

    /// Same as [`command`](Self::command) with a different ledger owner
    pub fn command_as(&self, owner: &str) -> Command {
        let mut cmd = self.command();
        cmd.env("TASKNOTE_OWNER", owner);
        cmd
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Runs `add` and returns the short ID it printed
    pub fn add_task(&self, args: &[&str]) -> String {
        let mut full_args = vec!["add"];
        full_args.extend_from_slice(args);
        let output = self.run_success(&full_args).get_output().stdout.clone();
        let stdout = strip_ansi(&String::from_utf8_lossy(&output));

        stdout
            .lines()
            .find_map(|line| line.split("Task ID: ").nth(1))
            .map(|id| id.trim().to_string())
            .expect("add did not print a task ID")
    }

    /// Runs `list --json` over a window and parses the items
    pub fn list_json(&self, from: &str, to: &str) -> Vec<serde_json::Value> {
        let output = self
            .run_success(&["list", "--json", "--from", from, "--to", to])
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("list --json did not print JSON")
    }
}

/// Removes terminal colour escapes from captured output
pub fn strip_ansi(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// Common test fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub fn daily_task_args() -> Vec<&'static str> {
        vec!["Daily standup", "--due", "2024-01-01", "--at", "9:30 AM", "--every", "daily"]
    }

    pub fn weekly_task_args() -> Vec<&'static str> {
        vec![
            "Gym",
            "--due",
            "2024-01-01",
            "--every",
            "weekly",
            "--on",
            "mon,wed",
            "--until",
            "2024-01-31",
        ]
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    /// Predicate to check if output contains task table headers
    pub fn has_task_table_headers() -> impl Predicate<str> {
        predicate::str::contains("ID")
            .and(predicate::str::contains("Title"))
            .and(predicate::str::contains("Status"))
    }

    /// Predicate to check if output indicates successful task creation
    pub fn task_created_successfully() -> impl Predicate<str> {
        predicate::str::contains("Created task")
            .or(predicate::str::contains("Created recurring task"))
    }

    /// Predicate to check for error messages
    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}

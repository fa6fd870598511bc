#![allow(dead_code)]

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
        let mut cmd = Command::cargo_bin("spendcast").expect("Failed to find spendcast binary");

        // Run inside the temp dir so no stray spendcast.toml is picked up
        cmd.current_dir(self.temp_dir.path());
        cmd.env("SPENDCAST_DATABASE_PATH", &self.db_path);
        cmd.env("SPENDCAST_TIMEZONE", "UTC");
        cmd.env_remove("SPENDCAST_LOG");

        cmd
    }

    pub fn db_path(&self) -> &std::path::Path {
        &self.db_path
    }

    pub fn temp_dir(&self) -> &std::path::Path {
        self.temp_dir.path()
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Runs a command that must succeed and returns its stdout
    pub fn stdout_of(&self, args: &[&str]) -> String {
        let output = self.run_success(args).get_output().stdout.clone();
        String::from_utf8(output).expect("stdout is not UTF-8")
    }

    /// Runs a `--json` command and parses its output
    pub fn json_of(&self, args: &[&str]) -> serde_json::Value {
        serde_json::from_str(&self.stdout_of(args)).expect("stdout is not JSON")
    }
}

/// Common test fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Semi-monthly salary paid on the 15th and the 30th
    pub fn salary_args() -> Vec<&'static str> {
        vec![
            "income", "add", "Salary", "2000",
            "--date", "2025-01-15",
            "--every", "semimonthly",
            "--secondary-day", "30",
            "--until", "2025-03-31",
        ]
    }

    /// Weekly expense over March 2025
    pub fn lunch_args() -> Vec<&'static str> {
        vec![
            "expense", "add", "Lunch club", "12.50",
            "--date", "2025-03-03",
            "--recurrence", "FREQ=WEEKLY",
            "--until", "2025-03-31",
            "--category", "food",
        ]
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    pub fn record_added() -> impl Predicate<str> {
        predicate::str::contains("✓").and(predicate::str::contains("Added"))
    }

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error")
    }
}

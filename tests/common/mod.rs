//! Test utilities for buildexit integration tests.
//!
//! This module provides the `TestEnv` struct with helper methods for setting up
//! an isolated home and working directory, running buildexit, and asserting
//! on the exit status it hands back to the shell.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use tempfile::TempDir;

/// Test environment with temporary home and working directories.
pub struct TestEnv {
    /// Stand-in for $HOME, so user config never leaks into tests
    pub home_dir: TempDir,
    /// Working directory buildexit runs in
    pub work_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with empty directories.
    pub fn new() -> Self {
        let home_dir = TempDir::new().expect("Failed to create home temp dir");
        let work_dir = TempDir::new().expect("Failed to create work temp dir");
        Self { home_dir, work_dir }
    }

    /// Get the path to the buildexit binary.
    pub fn bin() -> String {
        env!("CARGO_BIN_EXE_buildexit").to_string()
    }

    /// Path of the counterpart header shipped with the crate.
    pub fn shipped_header() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("contrib/exit_codes.h")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(Self::bin());
        cmd.args(args)
            .current_dir(&self.work_dir)
            .env("HOME", self.home_dir.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run buildexit with given arguments.
    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("Failed to run buildexit")
    }

    /// Run buildexit with given arguments and environment variables.
    pub fn run_with_env(&self, args: &[&str], envs: &[(&str, &str)]) -> Output {
        let mut cmd = self.command(args);
        for (key, value) in envs {
            cmd.env(key, value);
        }
        cmd.output().expect("Failed to run buildexit")
    }

    /// Run buildexit without HOME in its environment.
    pub fn run_without_home(&self, args: &[&str]) -> Output {
        self.command(args)
            .env_remove("HOME")
            .output()
            .expect("Failed to run buildexit")
    }

    /// Start buildexit in the background.
    pub fn spawn(&self, args: &[&str]) -> Child {
        self.command(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn buildexit")
    }

    /// Write .buildexit.toml in the working directory.
    pub fn write_local_config(&self, contents: &str) {
        fs::write(self.work_dir.path().join(".buildexit.toml"), contents)
            .expect("Failed to write config");
    }

    /// Write a file in the working directory and return its path.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.work_dir.path().join(name);
        fs::write(&path, contents).expect("Failed to write file");
        path
    }

    /// Assert the exit status the shell would see.
    pub fn assert_code(output: &Output, expected: i32) {
        assert_eq!(
            output.status.code(),
            Some(expected),
            "unexpected exit status\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    /// Get stdout as a string.
    pub fn stdout(output: &Output) -> String {
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Get stderr as a string.
    pub fn stderr(output: &Output) -> String {
        String::from_utf8_lossy(&output.stderr).to_string()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

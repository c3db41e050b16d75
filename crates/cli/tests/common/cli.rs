//! CLI command execution helpers
//!
//! Wraps the `jrnmaint` binary with a builder and convenient assertions.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// CLI command builder
pub struct JrnmaintCommand {
    binary_path: PathBuf,
    root: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
}

impl JrnmaintCommand {
    /// Create a new command against the store at `root`
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_jrnmaint")),
            root: root.as_ref().to_path_buf(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set environment variable
    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Execute command and capture its output
    pub fn execute(&self) -> Result<CommandResult> {
        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .current_dir(&self.root)
            .env("JRNMAINT_ROOT", &self.root)
            .env_remove("RUST_LOG")
            // Keep a developer's config file out of the tests
            .env("XDG_CONFIG_HOME", self.root.join(".config"))
            .envs(&self.env)
            .output()
            .context("Failed to execute jrnmaint")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect a specific exit code
    pub fn assert_exit(&self, code: i32) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.exit_code != code {
            anyhow::bail!(
                "Expected exit code {} but got {}:\nArgs: {:?}\nStdout: {}\nStderr: {}",
                code,
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }
}

/// Command execution result
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    /// Check if command succeeded
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Check if stdout contains text
    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }

    /// Check if stderr contains text
    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }

    /// Report lines with the `HH:MM:SS-` prefix removed
    pub fn report_lines(&self) -> Vec<&str> {
        self.stdout
            .lines()
            .filter_map(|line| line.get(9..).filter(|_| line.as_bytes().get(8) == Some(&b'-')))
            .collect()
    }
}

/// Macro for convenient command construction
///
/// Usage:
/// ```ignore
/// jrnmaint!(store.root(), "run", "QMLIB", "*PRINT", "*YES").assert_success()?;
/// ```
#[macro_export]
macro_rules! jrnmaint {
    ($root:expr, $($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::JrnmaintCommand::new($root);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}

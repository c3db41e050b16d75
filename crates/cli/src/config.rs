//! Configuration loading
//!
//! Settings come from, in increasing precedence: built-in defaults, the
//! TOML config file, the `JRNMAINT_ROOT` environment variable, then flags.

use anyhow::{Context, Result};
use journal::{JournalId, MaintError, ObjectName, OutputMode, RunConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_JOURNAL: &str = "AMQAJRN";
pub const DEFAULT_INFO_SPACE: &str = "AMQJRNINF";
pub const DEFAULT_MESSAGE_QUEUE: &str = "QMQMMSG";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Store root holding one directory per library
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub journal_name: Option<String>,
    #[serde(default)]
    pub info_space: Option<String>,
    #[serde(default)]
    pub message_queue: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }
}

/// Resolved settings shared by every command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub root: PathBuf,
    pub journal_name: ObjectName,
    pub info_space: ObjectName,
    pub message_queue: ObjectName,
    /// Config file the settings were read from, if any
    pub source: Option<PathBuf>,
}

impl Settings {
    /// Merge a config file with the `--root` override
    pub fn resolve(file: FileConfig, source: Option<PathBuf>, root: Option<PathBuf>) -> Result<Self> {
        let root = match root.or(file.root) {
            Some(root) => root,
            None => std::env::current_dir().context("Failed to get current directory")?,
        };

        Ok(Self {
            root,
            journal_name: object_name(file.journal_name.as_deref().unwrap_or(DEFAULT_JOURNAL), "journal_name")?,
            info_space: object_name(file.info_space.as_deref().unwrap_or(DEFAULT_INFO_SPACE), "info_space")?,
            message_queue: object_name(
                file.message_queue.as_deref().unwrap_or(DEFAULT_MESSAGE_QUEUE),
                "message_queue",
            )?,
            source,
        })
    }

    /// Load from `explicit`, or the default config file when it exists
    pub fn load(explicit: Option<&Path>, root: Option<PathBuf>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => config_file_path().filter(|p| p.exists()),
        };

        let file = match &path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, path, root)
    }

    /// Build the immutable run configuration for `library`
    pub fn run_config(&self, library: ObjectName, output: OutputMode, delete_receivers: bool) -> RunConfig {
        RunConfig {
            journal: JournalId::new(self.journal_name, library),
            info_space: self.info_space,
            output,
            delete_receivers,
        }
    }
}

fn object_name(raw: &str, key: &str) -> Result<ObjectName> {
    ObjectName::parse(raw).with_context(|| format!("Invalid {} '{}'", key, raw))
}

/// Default config file location (`<config dir>/jrnmaint/config.toml`)
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("jrnmaint").join("config.toml"))
}

/// Parse the `OUTPUT` argument (`*PRINT` or `*MSGQ`)
pub fn parse_output_mode(raw: &str) -> Result<OutputMode, MaintError> {
    match raw.trim_start_matches('*').to_ascii_uppercase().as_str() {
        "PRINT" => Ok(OutputMode::Print),
        "MSGQ" => Ok(OutputMode::MessageQueue),
        _ => Err(MaintError::InvalidArguments(format!(
            "expected *PRINT or *MSGQ, got '{}'",
            raw
        ))),
    }
}

/// Parse the `DELETE` argument (`*YES` or `*NO`)
pub fn parse_delete(raw: &str) -> Result<bool, MaintError> {
    match raw.trim_start_matches('*').to_ascii_uppercase().as_str() {
        "YES" => Ok(true),
        "NO" => Ok(false),
        _ => Err(MaintError::InvalidArguments(format!(
            "expected *YES or *NO, got '{}'",
            raw
        ))),
    }
}

/// Parse a library name argument
pub fn parse_library(raw: &str) -> Result<ObjectName, MaintError> {
    ObjectName::parse(raw).map_err(|e| MaintError::InvalidArguments(e.to_string()))
}

/// Example config file
pub fn example_config() -> String {
    format!(
        r#"# jrnmaint configuration

# Directory holding one subdirectory per queue manager library
root = "/var/mqm/qmgrs"

# Journal whose receiver chain is maintained
journal_name = "{}"

# User space holding the oldest required journal entry
info_space = "{}"

# Message queue used with OUTPUT(*MSGQ)
message_queue = "{}"
"#,
        DEFAULT_JOURNAL, DEFAULT_INFO_SPACE, DEFAULT_MESSAGE_QUEUE
    )
}

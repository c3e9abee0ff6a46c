//! Store configuration via `docket.toml`
//!
//! The only required setting is the location of the SQLite file. The
//! remaining knobs map onto connection pragmas applied once when the store
//! is opened, plus the codec's decode depth.

use docket_core::{DecodeDepth, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable consulted by [`StoreConfig::from_env`]
pub const PATH_ENV_VAR: &str = "DOCKET_DB_PATH";

/// Storage file used when no path is configured
pub const DEFAULT_DB_FILE: &str = "docket.db";

/// Path value that opens a private in-memory database
pub const IN_MEMORY_PATH: &str = ":memory:";

/// SQLite journal mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    /// Write-ahead log; readers proceed while a writer commits
    #[default]
    Wal,
    /// Rollback journal deleted after each transaction
    Delete,
    /// Journal kept in memory
    Memory,
}

impl JournalMode {
    /// Returns the `journal_mode` pragma value
    pub const fn pragma_value(self) -> &'static str {
        match self {
            JournalMode::Wal => "wal",
            JournalMode::Delete => "delete",
            JournalMode::Memory => "memory",
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_FILE)
}

fn default_foreign_keys() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// Store configuration loaded from `docket.toml`.
///
/// # Example
///
/// ```toml
/// path = "/var/lib/docket/cases.db"
/// journal_mode = "wal"
/// foreign_keys = true
/// busy_timeout_ms = 5000
/// nested_decode = "shallow"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file, or `:memory:`
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// Journal mode applied at open
    #[serde(default)]
    pub journal_mode: JournalMode,
    /// Enforce referential integrity
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,
    /// How long a statement waits on a locked database, in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// How deep decoding reconstitutes embedded structures
    #[serde(default)]
    pub nested_decode: DecodeDepth,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            journal_mode: JournalMode::default(),
            foreign_keys: default_foreign_keys(),
            busy_timeout_ms: default_busy_timeout_ms(),
            nested_decode: DecodeDepth::default(),
        }
    }
}

impl StoreConfig {
    /// Default settings for the given storage file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Default settings for a private in-memory database
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::from(IN_MEMORY_PATH),
            journal_mode: JournalMode::Memory,
            ..Self::default()
        }
    }

    /// Default settings with the path taken from `DOCKET_DB_PATH`
    ///
    /// Falls back to `docket.db` in the working directory.
    pub fn from_env() -> Self {
        match std::env::var_os(PATH_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::default(),
        }
    }

    /// True if this config opens an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == IN_MEMORY_PATH
    }

    /// Set the decode depth
    pub fn with_nested_decode(mut self, depth: DecodeDepth) -> Self {
        self.nested_decode = depth;
        self
    }

    /// Set the journal mode
    pub fn with_journal_mode(mut self, mode: JournalMode) -> Self {
        self.journal_mode = mode;
        self
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text is not valid config TOML.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

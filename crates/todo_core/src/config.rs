//! Board configuration and variant selection.
//!
//! # Responsibility
//! - Describe the two board variants and the policies each one implies.
//! - Resolve runtime configuration from environment variables.
//!
//! # Invariants
//! - Each variant persists under its own storage key.
//! - Resolution never panics; bad values surface as `ConfigError`.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Environment variable selecting the board variant (`premium|lovely`).
pub const ENV_VARIANT: &str = "TODO_BOARD_VARIANT";
/// Environment variable pointing at the SQLite file (`:memory:` for none).
pub const ENV_DB_PATH: &str = "TODO_BOARD_DB_PATH";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "TODO_BOARD_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "todo_board.sqlite3";
const IN_MEMORY_DB_PATH: &str = ":memory:";

/// Product flavor of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoardVariant {
    /// Percentage progress, inline editing, confirm-gated delete, dated header.
    #[default]
    Premium,
    /// Remaining-count progress, animated completion and exit, no editing.
    Lovely,
}

impl BoardVariant {
    /// Storage key holding this variant's serialized task list.
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Premium => "premiumTodos",
            Self::Lovely => "lovelyTodos",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Premium => "premium",
            Self::Lovely => "lovely",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "premium" | "a" => Ok(Self::Premium),
            "lovely" | "b" => Ok(Self::Lovely),
            other => Err(ConfigError::UnsupportedVariant(other.to_string())),
        }
    }

    pub fn supports_edit(self) -> bool {
        matches!(self, Self::Premium)
    }

    /// Whether deleting asks the user first instead of animating out.
    pub fn confirms_delete(self) -> bool {
        matches!(self, Self::Premium)
    }

    /// Whether completions and removals commit after an animation delay.
    pub fn defers_commits(self) -> bool {
        matches!(self, Self::Lovely)
    }

    pub fn shows_date(self) -> bool {
        matches!(self, Self::Premium)
    }
}

/// Where the board keeps its key-value data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    File(PathBuf),
    InMemory,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub variant: BoardVariant,
    pub storage: StorageLocation,
    pub log_level: &'static str,
}

/// Configuration resolution errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedVariant(String),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedVariant(value) => write!(
                f,
                "unsupported board variant `{value}`; expected premium|lovely"
            ),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            variant: BoardVariant::default(),
            storage: StorageLocation::File(default_db_path()),
            log_level: default_log_level(),
        }
    }
}

impl BoardConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration from an arbitrary variable lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(raw) = read(ENV_VARIANT) {
            config.variant = BoardVariant::parse(&raw)?;
        }
        if let Some(raw) = read(ENV_DB_PATH) {
            config.storage = if raw == IN_MEMORY_DB_PATH {
                StorageLocation::InMemory
            } else {
                StorageLocation::File(PathBuf::from(raw))
            };
        }
        if let Some(raw) = read(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&raw).map_err(ConfigError::InvalidLogLevel)?;
        }
        Ok(config)
    }
}

fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve database path and logging settings for FFI and CLI entry points.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - Resolution never fails; every setting has a default.

use crate::logging::default_log_level;
use std::path::PathBuf;

/// Environment variable overriding the SQLite database path.
pub const DB_PATH_ENV: &str = "BOOKSHELF_DB_PATH";
/// Environment variable overriding the log level.
pub const LOG_LEVEL_ENV: &str = "BOOKSHELF_LOG_LEVEL";
/// Environment variable enabling file logging into a directory.
pub const LOG_DIR_ENV: &str = "BOOKSHELF_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "bookshelf.sqlite3";

/// Settings shared by the FFI and CLI front ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute log directory; logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Builds config from `BOOKSHELF_*` variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        Self {
            db_path: value(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            log_level: value(LOG_LEVEL_ENV).unwrap_or(defaults.log_level),
            log_dir: value(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}

fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn from_lookup_uses_defaults_when_unset() {
        let config = CoreConfig::from_lookup(|_| None);
        assert_eq!(config, CoreConfig::default());
        assert!(config.db_path.ends_with("bookshelf.sqlite3"));
    }

    #[test]
    fn from_lookup_trims_and_ignores_blank_values() {
        let env = HashMap::from([
            (DB_PATH_ENV, " /data/books.db ".to_string()),
            (LOG_LEVEL_ENV, "warn".to_string()),
            (LOG_DIR_ENV, "   ".to_string()),
        ]);
        let config = CoreConfig::from_lookup(|key| env.get(key).cloned());

        assert_eq!(config.db_path, PathBuf::from("/data/books.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, None);
    }
}

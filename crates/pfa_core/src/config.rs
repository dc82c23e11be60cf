//! Runtime configuration from the environment.
//!
//! Variables are trimmed; a blank value counts as unset.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "PFA_DB_PATH";
pub const LOG_DIR_ENV: &str = "PFA_LOG_DIR";
pub const LOG_LEVEL_ENV: &str = "PFA_LOG_LEVEL";

const DEFAULT_DB_FILE: &str = "pfa_core.sqlite3";
const DEFAULT_LOG_SUBDIR: &str = "pfa_logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let temp = std::env::temp_dir();
        Self {
            db_path: temp.join(DEFAULT_DB_FILE),
            log_dir: temp.join(DEFAULT_LOG_SUBDIR),
            log_level: default_log_level().to_string(),
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();
        Self {
            db_path: read(DB_PATH_ENV).map_or(defaults.db_path, PathBuf::from),
            log_dir: read(LOG_DIR_ENV).map_or(defaults.log_dir, PathBuf::from),
            log_level: read(LOG_LEVEL_ENV).unwrap_or(defaults.log_level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DB_PATH_ENV, LOG_LEVEL_ENV};
    use std::path::PathBuf;

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = CoreConfig::from_lookup(|name| match name {
            DB_PATH_ENV => Some("   ".to_string()),
            LOG_LEVEL_ENV => Some(" warn ".to_string()),
            _ => None,
        });
        assert_eq!(config.db_path, CoreConfig::default().db_path);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn explicit_db_path_is_used_verbatim() {
        let config = CoreConfig::from_lookup(|name| {
            (name == DB_PATH_ENV).then(|| "/data/pfa.sqlite3".to_string())
        });
        assert_eq!(config.db_path, PathBuf::from("/data/pfa.sqlite3"));
        assert!(config.db_path.ends_with("pfa.sqlite3"));
    }
}

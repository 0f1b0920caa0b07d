//! Environment-driven application configuration.
//!
//! # Responsibility
//! - Resolve database path, logging and auto-save settings.
//! - Reject malformed values instead of silently falling back.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - `autosave_delay_ms` is always positive.

use crate::logging::default_log_level;
use crate::model::note::SortOrder;
use crate::session::DEFAULT_AUTOSAVE_DELAY_MS;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "NOTEPAD_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "NOTEPAD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTEPAD_LOG_DIR";
pub const ENV_AUTOSAVE_MS: &str = "NOTEPAD_AUTOSAVE_MS";
pub const ENV_DEFAULT_SORT: &str = "NOTEPAD_DEFAULT_SORT";

const DEFAULT_DB_FILE_NAME: &str = "notepad.sqlite3";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {}", self.key, self.message)
    }
}

impl Error for ConfigError {}

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling logs. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub autosave_delay_ms: u64,
    pub default_sort: SortOrder,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            default_sort: SortOrder::default(),
        }
    }
}

impl AppConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = read(ENV_AUTOSAVE_MS) {
            config.autosave_delay_ms = match raw.parse::<u64>() {
                Ok(value) if value > 0 => value,
                _ => {
                    return Err(ConfigError {
                        key: ENV_AUTOSAVE_MS,
                        message: format!("expected a positive integer, got `{raw}`"),
                    });
                }
            };
        }
        if let Some(raw) = read(ENV_DEFAULT_SORT) {
            config.default_sort = raw.parse::<SortOrder>().map_err(|err| ConfigError {
                key: ENV_DEFAULT_SORT,
                message: err.to_string(),
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ENV_AUTOSAVE_MS, ENV_DB_PATH, ENV_DEFAULT_SORT, ENV_LOG_DIR};
    use crate::model::note::SortOrder;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.autosave_delay_ms, 2_000);
        assert_eq!(config.default_sort, SortOrder::UpdatedDesc);
        assert!(config.db_path.ends_with("notepad.sqlite3"));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn overrides_are_trimmed_and_blank_values_ignored() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, " /data/notes.db "),
            (ENV_LOG_DIR, "   "),
            (ENV_AUTOSAVE_MS, "500"),
            (ENV_DEFAULT_SORT, "title_asc"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/notes.db"));
        assert_eq!(config.log_dir, None);
        assert_eq!(config.autosave_delay_ms, 500);
        assert_eq!(config.default_sort, SortOrder::TitleAsc);
    }

    #[test]
    fn rejects_zero_or_garbage_autosave_delay() {
        for raw in ["0", "soon", "-5"] {
            let err = AppConfig::from_lookup(lookup(&[(ENV_AUTOSAVE_MS, raw)])).unwrap_err();
            assert_eq!(err.key, ENV_AUTOSAVE_MS);
        }
    }

    #[test]
    fn rejects_unknown_sort_order() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_DEFAULT_SORT, "newest")])).unwrap_err();
        assert!(err.to_string().contains("newest"));
    }
}

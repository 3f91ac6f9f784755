//! Core runtime configuration.
//!
//! Values come from serde (host-supplied JSON or similar) or from the
//! process environment. Blank values fall back to defaults.

use crate::logging::{default_log_level, init_logging, LogLevel, LoggingError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "PINNOTE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "PINNOTE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PINNOTE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "pinnote.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Level name accepted by [`LogLevel::parse`].
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` leaves logging off.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level().as_str().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads `PINNOTE_DB_PATH`, `PINNOTE_LOG_LEVEL` and `PINNOTE_LOG_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            db_path: non_blank(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            log_level: non_blank(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: non_blank(ENV_LOG_DIR).map(PathBuf::from),
        }
    }

    /// Parsed log level; unsupported names fall back to the build default.
    pub fn level(&self) -> LogLevel {
        LogLevel::parse(&self.log_level).unwrap_or_else(|_| default_log_level())
    }

    /// Starts file logging at [`CoreConfig::level`] when `log_dir` is set.
    ///
    /// Returns `Ok(false)` and leaves the logger untouched when no
    /// directory is configured.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        let Some(log_dir) = self.log_dir.as_deref() else {
            return Ok(false);
        };
        init_logging(self.level().as_str(), &log_dir.to_string_lossy())?;
        Ok(true)
    }
}

fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use crate::logging::{default_log_level, init_logging, LogLevel, LoggingError};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = CoreConfig::from_lookup(lookup(&[]));
        assert_eq!(config, CoreConfig::default());
        assert!(config.db_path.ends_with("pinnote.sqlite3"));
        assert_eq!(config.level(), default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn values_are_trimmed_and_blank_values_fall_back() {
        let config = CoreConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "  /data/notes.db "),
            (ENV_LOG_LEVEL, "   "),
            (ENV_LOG_DIR, "/var/log/pinnote"),
        ]));
        assert_eq!(config.db_path, PathBuf::from("/data/notes.db"));
        assert_eq!(config.log_level, default_log_level().as_str());
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/pinnote")));
    }

    #[test]
    fn unsupported_level_falls_back_to_default() {
        let config = CoreConfig::from_lookup(lookup(&[(ENV_LOG_LEVEL, "chatty")]));
        assert_eq!(config.level(), default_log_level());

        let config = CoreConfig::from_lookup(lookup(&[(ENV_LOG_LEVEL, "WARNING")]));
        assert_eq!(config.level(), LogLevel::Warn);
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let config: CoreConfig =
            serde_json::from_str(r#"{"db_path":"/tmp/a.sqlite3"}"#).expect("valid json");
        assert_eq!(config.db_path, PathBuf::from("/tmp/a.sqlite3"));
        assert_eq!(config.log_level, CoreConfig::default().log_level);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn init_logging_without_dir_stays_off() {
        let config = CoreConfig::from_lookup(lookup(&[(ENV_LOG_LEVEL, "error")]));
        assert!(!config.init_logging().unwrap());
    }

    #[test]
    fn init_logging_uses_configured_dir_and_fallback_level() {
        let config = CoreConfig::from_lookup(lookup(&[
            (ENV_LOG_LEVEL, "chatty"),
            (ENV_LOG_DIR, "relative/logs"),
        ]));
        match config.init_logging() {
            Err(LoggingError::RelativeDir(dir)) => assert_eq!(dir, "relative/logs"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

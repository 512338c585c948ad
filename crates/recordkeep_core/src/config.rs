//! Environment-driven configuration.
//!
//! # Invariants
//! - Unset variables fall back to documented defaults.
//! - Set-but-invalid values are errors, never silently defaulted.
//!
//! | variable | default |
//! |---|---|
//! | `RECORDKEEP_DB_PATH` | unset: in-memory database |
//! | `RECORDKEEP_LOG_LEVEL` | `default_log_level()` |
//! | `RECORDKEEP_LOG_DIR` | unset: logging disabled |
//! | `RECORDKEEP_SEED_DEMO` | `false` |

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "RECORDKEEP_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "RECORDKEEP_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "RECORDKEEP_LOG_DIR";
pub const ENV_SEED_DEMO: &str = "RECORDKEEP_SEED_DEMO";

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, message } => write!(f, "invalid value for {key}: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Runtime configuration for opening stores and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file; `None` opens an in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute log directory; `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
    /// Seed demo rows into empty tables after opening.
    pub seed_demo: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            seed_demo: false,
        }
    }
}

impl CoreConfig {
    /// Loads configuration from the process environment, reading `.env`
    /// first when one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let db_path = optional_value(&lookup, ENV_DB_PATH)?.map(PathBuf::from);
        let log_level = optional_value(&lookup, ENV_LOG_LEVEL)?.unwrap_or(defaults.log_level);
        let log_dir = optional_value(&lookup, ENV_LOG_DIR)?.map(PathBuf::from);
        let seed_demo = match optional_value(&lookup, ENV_SEED_DEMO)? {
            Some(value) => parse_bool(ENV_SEED_DEMO, &value)?,
            None => defaults.seed_demo,
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir,
            seed_demo,
        })
    }
}

fn optional_value(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Err(ConfigError::InvalidValue {
            key,
            message: "value must not be empty".to_string(),
        }),
        Some(value) => Ok(Some(value.trim().to_string())),
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key,
            message: format!("expected a boolean, got `{other}`"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_SEED_DEMO};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CoreConfig::from_lookup(lookup_from(&[])).expect("defaults load");
        assert_eq!(config, CoreConfig::default());
        assert!(config.db_path.is_none());
        assert!(!config.seed_demo);
    }

    #[test]
    fn values_are_read_and_trimmed() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, " /var/lib/recordkeep.db "),
            (ENV_LOG_DIR, "/var/log/recordkeep"),
            (ENV_SEED_DEMO, "Yes"),
        ]))
        .expect("config loads");

        assert_eq!(
            config.db_path,
            Some(PathBuf::from("/var/lib/recordkeep.db"))
        );
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/recordkeep")));
        assert!(config.seed_demo);
    }

    #[test]
    fn invalid_boolean_and_blank_values_are_rejected() {
        let err = CoreConfig::from_lookup(lookup_from(&[(ENV_SEED_DEMO, "maybe")]))
            .expect_err("bad boolean must fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: ENV_SEED_DEMO,
                ..
            }
        ));

        let err = CoreConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, "  ")]))
            .expect_err("blank path must fail");
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_DB_PATH, .. }));
    }
}

//! Engine configuration.
//!
//! Defaults, overridden by an optional JSON file, overridden in turn by
//! environment variables:
//!
//! | Field | Env var | Default |
//! |---|---|---|
//! | `lock_timeout_ms` | `CAFE_LOCK_TIMEOUT_MS` | 250 |
//! | `actor_buffer` | `CAFE_ACTOR_BUFFER` | 32 |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const LOCK_TIMEOUT_ENV: &str = "CAFE_LOCK_TIMEOUT_MS";
pub const ACTOR_BUFFER_ENV: &str = "CAFE_ACTOR_BUFFER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid {key} value: {value}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deadline for acquiring all mutation rights of one operation.
    pub lock_timeout_ms: u64,
    /// Request channel capacity of each actor.
    pub actor_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 250,
            actor_buffer: 32,
        }
    }
}

impl EngineConfig {
    /// Loads `path` (if given and present) and applies the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Reads a JSON file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies overrides from `lookup` (the environment in production) and
    /// validates the result.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(LOCK_TIMEOUT_ENV) {
            self.lock_timeout_ms = parse_var(LOCK_TIMEOUT_ENV, value)?;
        }
        if let Some(value) = lookup(ACTOR_BUFFER_ENV) {
            self.actor_buffer = parse_var(ACTOR_BUFFER_ENV, value)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock_timeout_ms == 0 {
            return Err(ConfigError::Zero("lock_timeout_ms"));
        }
        if self.actor_buffer == 0 {
            return Err(ConfigError::Zero("actor_buffer"));
        }
        Ok(())
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("cafe-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("cafe-config-that-does-not-exist.json");
        assert_eq!(EngineConfig::from_file(&path).unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = temp_file("partial.json", r#"{ "lock_timeout_ms": 900 }"#);
        let config = EngineConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.lock_timeout_ms, 900);
        assert_eq!(config.actor_buffer, 32);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let path = temp_file("broken.json", "{ lock_timeout_ms: ");
        let err = EngineConfig::from_file(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn environment_overrides_file_values() {
        let config = EngineConfig {
            lock_timeout_ms: 900,
            actor_buffer: 8,
        }
        .with_overrides(env(&[(LOCK_TIMEOUT_ENV, "40")]))
        .unwrap();
        assert_eq!(config.lock_timeout(), Duration::from_millis(40));
        assert_eq!(config.actor_buffer, 8);
    }

    #[test]
    fn bad_or_zero_values_are_rejected() {
        let err = EngineConfig::default()
            .with_overrides(env(&[(ACTOR_BUFFER_ENV, "lots")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid CAFE_ACTOR_BUFFER value: lots");

        let err = EngineConfig::default()
            .with_overrides(env(&[(LOCK_TIMEOUT_ENV, "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Zero("lock_timeout_ms")));
    }
}

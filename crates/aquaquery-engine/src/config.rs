//! Engine configuration.
//!
//! Settings come from a TOML file (see `config/default.toml`) with every
//! field defaulted, followed by `AQUAQUERY_*` environment overrides.  Scoring
//! weights and the pattern table are compiled in and not configurable.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};

/// Prefix shared by all environment overrides.
pub const ENV_PREFIX: &str = "AQUAQUERY_";

/// Complete configuration for an AquaQuery deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cache: CacheConfig,
    pub context: ContextConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Maximum entry age in seconds.
    pub ttl_secs: u64,
    /// Maximum number of cached responses.
    pub capacity: usize,
    /// How often the server sweeps expired entries.
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 1800,
            capacity: 100,
            sweep_interval_secs: 300,
        }
    }
}

/// `[context]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Utterances remembered per session.
    pub history_capacity: usize,
    /// Seconds a session may sit unused before it is dropped.
    pub idle_timeout_secs: u64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            history_capacity: 10,
            idle_timeout_secs: 3600,
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of the compact format.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document.  Missing sections and fields take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| EngineError::Config {
            reason: format!("failed to parse TOML config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = ?path, "configuration file does not exist, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| EngineError::Config {
            reason: format!("failed to read {}: {e}", path.display()),
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(path = ?path, "configuration loaded from file");
        Ok(config)
    }

    /// Load `path` (if given) and then apply overrides from the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides(std::env::vars())?;
        Ok(config)
    }

    /// Apply `AQUAQUERY_*` overrides from `vars`.  Unrelated keys are
    /// ignored.
    pub fn apply_env_overrides<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref().trim();

            match name {
                "CACHE_TTL_SECS" => self.cache.ttl_secs = parse_env(name, value)?,
                "CACHE_CAPACITY" => self.cache.capacity = parse_env(name, value)?,
                "CACHE_ENABLED" => self.cache.enabled = parse_bool(name, value)?,
                "SESSION_IDLE_SECS" => {
                    self.context.idle_timeout_secs = parse_env(name, value)?;
                }
                "BIND_ADDR" => self.server.bind_addr = value.to_string(),
                "PORT" => self.server.port = parse_env(name, value)?,
                "LOG_LEVEL" => self.logging.level = value.to_string(),
                _ => continue,
            }
            debug!(key = %key.as_ref(), "configuration override applied");
        }
        self.validate()
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.cache.capacity == 0 {
            return Err(EngineError::Config {
                reason: "cache.capacity must be at least 1".into(),
            });
        }
        if self.cache.ttl_secs == 0 {
            return Err(EngineError::Config {
                reason: "cache.ttl_secs must be at least 1".into(),
            });
        }
        if self.cache.sweep_interval_secs == 0 {
            return Err(EngineError::Config {
                reason: "cache.sweep_interval_secs must be at least 1".into(),
            });
        }
        if self.context.idle_timeout_secs == 0 {
            return Err(EngineError::Config {
                reason: "context.idle_timeout_secs must be at least 1".into(),
            });
        }
        if self.server.bind_addr.trim().is_empty() {
            return Err(EngineError::Config {
                reason: "server.bind_addr must not be empty".into(),
            });
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| EngineError::Config {
        reason: format!("{ENV_PREFIX}{name}: cannot parse {value:?}"),
    })
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(EngineError::Config {
            reason: format!("{ENV_PREFIX}{name}: expected a boolean, got {value:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_secs, 1800);
        assert_eq!(config.cache.capacity, 100);
        assert_eq!(config.context.history_capacity, 10);
        assert_eq!(config.context.idle_timeout_secs, 3600);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let shipped = include_str!("../../../config/default.toml");
        assert_eq!(
            EngineConfig::from_toml_str(shipped).unwrap(),
            EngineConfig::default()
        );
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [cache]
            ttl_secs = 60

            [server]
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.capacity, 100);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_addr, "127.0.0.1");
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = EngineConfig::from_toml_str("[cache]\ncapacity = 0\n").unwrap_err();
        assert!(matches!(err, EngineError::Config { .. }));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = EngineConfig::from_toml_str("[cache\n").unwrap_err();
        assert!(matches!(err, EngineError::Config { .. }));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = EngineConfig::default();
        config
            .apply_env_overrides([
                ("AQUAQUERY_CACHE_TTL_SECS", "120"),
                ("AQUAQUERY_CACHE_ENABLED", "false"),
                ("AQUAQUERY_PORT", "3000"),
                ("AQUAQUERY_SESSION_IDLE_SECS", "600"),
                ("AQUAQUERY_LOG_LEVEL", "debug"),
                ("HOME", "/root"),
                ("AQUAQUERY_SOMETHING_ELSE", "x"),
            ])
            .unwrap();
        assert_eq!(config.cache.ttl_secs, 120);
        assert!(!config.cache.enabled);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.context.idle_timeout_secs, 600);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn bad_env_values_are_rejected() {
        let mut config = EngineConfig::default();
        assert!(config.apply_env_overrides([("AQUAQUERY_PORT", "eighty")]).is_err());
        assert!(config.apply_env_overrides([("AQUAQUERY_CACHE_ENABLED", "maybe")]).is_err());
        assert!(config.apply_env_overrides([("AQUAQUERY_CACHE_CAPACITY", "0")]).is_err());

        let mut fresh = EngineConfig::default();
        assert!(fresh.apply_env_overrides([("AQUAQUERY_SESSION_IDLE_SECS", "0")]).is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"warn\"\njson = true").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.json);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}

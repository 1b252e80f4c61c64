//! Settings: defaults, then an optional `carmart.toml`, then `CARMART__*`
//! environment variables (`CARMART__CACHE__NAMESPACE=cars`).

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::cache::CACHE_NAME;
use crate::codec::ValueFormat;
use crate::seed::SeedStrategy;

const LOCAL_CONFIG_BASENAME: &str = "carmart";
const ENV_PREFIX: &str = "CARMART";
const DEFAULT_KEY_PREFIX: &str = "carmart:";
const DEFAULT_LOCK_TTL_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub cache: CacheSettings,
    pub seed: SeedSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub namespace: String,
    pub backend: CacheBackend,
    pub redis_url: Option<String>,
    /// Prefix for every Redis key this crate writes.
    pub key_prefix: String,
    pub value_format: ValueFormat,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            namespace: CACHE_NAME.to_string(),
            backend: CacheBackend::default(),
            redis_url: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            value_format: ValueFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedSettings {
    pub strategy: SeedStrategy,
    pub lock_ttl_seconds: u64,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            strategy: SeedStrategy::default(),
            lock_ttl_seconds: DEFAULT_LOCK_TTL_SECS,
        }
    }
}

impl SeedSettings {
    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_seconds)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingSettings {
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.level)
            .map_err(|err| ConfigError::invalid("logging.level", err.to_string()))
    }
}

impl Settings {
    /// Load from `./carmart.toml` (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(Config::builder().add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false)))
    }

    /// Load from the given file and the environment. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::build(Config::builder().add_source(File::from(path).required(true)))
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.namespace.trim().is_empty() {
            return Err(ConfigError::invalid("cache.namespace", "must not be empty"));
        }
        if self.cache.backend == CacheBackend::Redis
            && self.cache.redis_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::invalid(
                "cache.redis_url",
                "required when cache.backend is `redis`",
            ));
        }
        if self.seed.lock_ttl_seconds == 0 {
            return Err(ConfigError::invalid(
                "seed.lock_ttl_seconds",
                "must be greater than zero",
            ));
        }
        self.logging.level_filter()?;
        Ok(())
    }
}

use std::time::Duration;

use serde::Deserialize;

use crate::domain::{DomainError, KeySpace};
use crate::infrastructure::store::{StoreConfig, StoreType};
use crate::infrastructure::token::TokenCacheConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub tokens: TokenSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Backing store selection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// "in_memory" or "redis"
    pub backend: String,
    pub redis_url: Option<String>,
    /// Namespace prepended to provisioned keys and entitlement counters
    pub key_prefix: String,
    pub connection_timeout_secs: u64,
}

/// Token cache bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenSettings {
    pub ttl_secs: u64,
    pub max_capacity: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreType::InMemory.to_string(),
            redis_url: None,
            key_prefix: String::new(),
            connection_timeout_secs: 5,
        }
    }
}

impl Default for TokenSettings {
    fn default() -> Self {
        let defaults = TokenCacheConfig::default();
        Self {
            ttl_secs: defaults.ttl.as_secs(),
            max_capacity: defaults.max_capacity,
        }
    }
}

impl StoreSettings {
    pub fn store_config(&self) -> Result<StoreConfig, DomainError> {
        Ok(StoreConfig {
            store_type: self.backend.parse()?,
            redis_url: self.redis_url.clone(),
            connection_timeout: Duration::from_secs(self.connection_timeout_secs),
        })
    }

    pub fn keyspace(&self) -> KeySpace {
        KeySpace::new(self.key_prefix.clone())
    }
}

impl TokenSettings {
    pub fn cache_config(&self) -> Result<TokenCacheConfig, DomainError> {
        if self.ttl_secs == 0 {
            return Err(DomainError::configuration("tokens.ttl_secs must be positive"));
        }

        Ok(TokenCacheConfig::default()
            .with_ttl(Duration::from_secs(self.ttl_secs))
            .with_max_capacity(self.max_capacity))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

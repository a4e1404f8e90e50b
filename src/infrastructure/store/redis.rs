//! Redis key-value store

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client, RedisError};

use crate::domain::{DomainError, KeyValueStore};

/// Configuration for the Redis store
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Connection timeout
    pub connection_timeout: Duration,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Redis-backed store
///
/// Commands go through a `ConnectionManager`, which reconnects on its own.
/// Errors never carry the key, since keys embed secrets.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    config: RedisStoreConfig,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

fn unavailable(command: &'static str) -> impl FnOnce(RedisError) -> DomainError {
    move |e| DomainError::store_unavailable(format!("{} failed: {}", command, e))
}

impl RedisStore {
    pub async fn new(config: RedisStoreConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            DomainError::configuration(format!("Failed to create Redis client: {}", e))
        })?;

        let manager_config = ConnectionManagerConfig::new()
            .set_connection_timeout(config.connection_timeout);

        let connection = ConnectionManager::new_with_config(client, manager_config)
            .await
            .map_err(|e| {
                DomainError::store_unavailable(format!("Failed to connect to Redis: {}", e))
            })?;

        Ok(Self { connection, config })
    }

    pub async fn with_url(url: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(RedisStoreConfig::new(url)).await
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let mut conn = self.connection.clone();
        conn.get(key).await.map_err(unavailable("GET"))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();
        conn.set(key, value).await.map_err(unavailable("SET"))
    }

    async fn del(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();
        let deleted: i64 = conn.del(key).await.map_err(unavailable("DEL"))?;
        Ok(deleted > 0)
    }

    async fn hset(&self, hash: &str, field: &str, value: &str) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();
        let _: i64 = conn
            .hset(hash, field, value)
            .await
            .map_err(unavailable("HSET"))?;
        Ok(())
    }

    async fn hget(&self, hash: &str, field: &str) -> Result<Option<String>, DomainError> {
        let mut conn = self.connection.clone();
        conn.hget(hash, field).await.map_err(unavailable("HGET"))
    }

    async fn hdel(&self, hash: &str, field: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();
        let deleted: i64 = conn.hdel(hash, field).await.map_err(unavailable("HDEL"))?;
        Ok(deleted > 0)
    }

    async fn hexists(&self, hash: &str, field: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();
        conn.hexists(hash, field)
            .await
            .map_err(unavailable("HEXISTS"))
    }

    async fn hkeys(&self, hash: &str) -> Result<Vec<String>, DomainError> {
        let mut conn = self.connection.clone();
        conn.hkeys(hash).await.map_err(unavailable("HKEYS"))
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, DomainError> {
        let mut conn = self.connection.clone();
        conn.incr(key, delta).await.map_err(unavailable("INCRBY"))
    }

    async fn decr(&self, key: &str) -> Result<i64, DomainError> {
        let mut conn = self.connection.clone();
        conn.decr(key, 1).await.map_err(unavailable("DECR"))
    }

    async fn expire_at(&self, key: &str, at: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();
        conn.expire_at(key, at.timestamp())
            .await
            .map_err(unavailable("EXPIREAT"))
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        let mut conn = self.connection.clone();
        let ttl_secs: i64 = conn.ttl(key).await.map_err(unavailable("TTL"))?;

        // -2 if the key doesn't exist, -1 if it has no expiry
        if ttl_secs < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_secs(ttl_secs as u64)))
        }
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(unavailable("PING"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: these tests require a running Redis instance
    // Run with: cargo test -- --ignored

    async fn store() -> RedisStore {
        RedisStore::with_url("redis://127.0.0.1:6379").await.unwrap()
    }

    #[test]
    fn test_config_builder() {
        let config = RedisStoreConfig::new("redis://cache:6379")
            .with_connection_timeout(Duration::from_secs(2));

        assert_eq!(config.url, "redis://cache:6379");
        assert_eq!(config.connection_timeout, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_invalid_url_is_configuration_error() {
        let result = RedisStore::with_url("not a url").await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_counter_with_expiry() {
        let store = store().await;
        let key = "keymem-test-counter";

        store.set(key, "3").await.unwrap();
        assert!(store
            .expire_at(key, Utc::now() + chrono::TimeDelta::hours(1))
            .await
            .unwrap());
        assert_eq!(store.decr(key).await.unwrap(), 2);
        assert!(store.ttl(key).await.unwrap().is_some());

        store.del(key).await.unwrap();
        assert_eq!(store.ttl(key).await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_hash() {
        let store = store().await;
        let hash = "keymem-test-hash";

        store.hset(hash, "f", "v").await.unwrap();
        assert!(store.hexists(hash, "f").await.unwrap());
        assert_eq!(store.hkeys(hash).await.unwrap(), vec!["f".to_string()]);
        assert!(store.hdel(hash, "f").await.unwrap());
    }
}

//! Bounded TTL cache of live tokens

use std::time::Duration;

use moka::future::Cache as MokaCache;
use moka::policy::EvictionPolicy;

use crate::domain::{Token, TokenRecord};

/// Configuration for the token cache
#[derive(Debug, Clone)]
pub struct TokenCacheConfig {
    /// Maximum number of live tokens
    pub max_capacity: u64,
    /// Lifetime of a token from minting
    pub ttl: Duration,
}

impl Default for TokenCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl TokenCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Token → record map with time-based and least-recently-used eviction
///
/// The only in-process state of the service. Losing it invalidates every
/// outstanding token.
#[derive(Debug, Clone)]
pub struct TokenCache {
    cache: MokaCache<String, TokenRecord>,
}

impl TokenCache {
    pub fn new(config: &TokenCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self { cache }
    }

    pub async fn insert(&self, token: &Token, record: TokenRecord) {
        self.cache.insert(token.as_str().to_string(), record).await;
    }

    pub async fn get(&self, token: &Token) -> Option<TokenRecord> {
        self.cache.get(token.as_str()).await
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Flush pending maintenance (evictions, counts)
    #[cfg(test)]
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(&TokenCacheConfig::default())
    }
}

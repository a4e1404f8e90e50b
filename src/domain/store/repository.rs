//! Key-value store capability consumed by every component

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Atomic single-key command interface of the backing store
///
/// Each call is indivisible on its own. No multi-key transaction is offered,
/// so any sequence of calls can interleave with other callers.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// GET
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// SET, clearing any expiry on the key
    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// DEL, returns whether the key existed
    async fn del(&self, key: &str) -> Result<bool, DomainError>;

    /// HSET
    async fn hset(&self, hash: &str, field: &str, value: &str) -> Result<(), DomainError>;

    /// HGET
    async fn hget(&self, hash: &str, field: &str) -> Result<Option<String>, DomainError>;

    /// HDEL, returns whether the field existed
    async fn hdel(&self, hash: &str, field: &str) -> Result<bool, DomainError>;

    /// HEXISTS
    async fn hexists(&self, hash: &str, field: &str) -> Result<bool, DomainError>;

    /// HKEYS
    async fn hkeys(&self, hash: &str) -> Result<Vec<String>, DomainError>;

    /// INCRBY, treating a missing key as zero
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, DomainError>;

    /// DECR, treating a missing key as zero
    async fn decr(&self, key: &str) -> Result<i64, DomainError>;

    /// EXPIREAT; an instant in the past deletes the key
    async fn expire_at(&self, key: &str, at: DateTime<Utc>) -> Result<bool, DomainError>;

    /// TTL; `None` when the key is missing or has no expiry
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError>;

    /// Round-trip check used by readiness probes
    async fn ping(&self) -> Result<(), DomainError>;
}

/// Typed helpers on top of the raw store commands
pub trait KeyValueStoreExt: KeyValueStore {
    /// GET parsed as a signed counter
    fn get_int<'a>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<i64>, DomainError>> + Send {
        async move {
            match self.get(key).await? {
                Some(raw) => raw.trim().parse::<i64>().map(Some).map_err(|_| {
                    DomainError::internal("stored counter is not an integer".to_string())
                }),
                None => Ok(None),
            }
        }
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStoreExt for T {}

//! In-memory key-value store

use std::collections::HashMap;
use std::sync::{RwLock, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{DomainError, KeyValueStore};

#[derive(Debug, Clone)]
enum Value {
    Plain(String),
    Hash(HashMap<String, String>),
}

#[derive(Debug, Clone)]
struct Slot {
    value: Value,
    expires_at: Option<DateTime<Utc>>,
}

impl Slot {
    fn plain(value: impl Into<String>) -> Self {
        Self {
            value: Value::Plain(value.into()),
            expires_at: None,
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Process-local store with Redis command semantics
///
/// Every command takes the lock once, so each command is atomic on its own.
/// Expired keys are purged lazily when touched. Data is lost when the
/// process terminates.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    slots: RwLock<HashMap<String, Slot>>,
}

type Slots<'a> = RwLockWriteGuard<'a, HashMap<String, Slot>>;

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<Slots<'_>, DomainError> {
        self.slots
            .write()
            .map_err(|e| DomainError::store_unavailable(format!("Failed to acquire lock: {}", e)))
    }

    /// Fetch a live slot, dropping it first if it has expired
    fn live<'a>(slots: &'a mut Slots<'_>, key: &str) -> Option<&'a mut Slot> {
        let now = Utc::now();

        if slots.get(key).is_some_and(|slot| slot.is_expired(now)) {
            slots.remove(key);
        }

        slots.get_mut(key)
    }

    fn wrong_type() -> DomainError {
        DomainError::internal("operation against a key holding the wrong kind of value")
    }

    fn add(slots: &mut Slots<'_>, key: &str, delta: i64) -> Result<i64, DomainError> {
        match Self::live(slots, key) {
            Some(slot) => {
                let Value::Plain(raw) = &slot.value else {
                    return Err(Self::wrong_type());
                };

                let current: i64 = raw
                    .parse()
                    .map_err(|_| DomainError::internal("value is not an integer"))?;
                let next = current
                    .checked_add(delta)
                    .ok_or_else(|| DomainError::internal("increment would overflow"))?;

                slot.value = Value::Plain(next.to_string());
                Ok(next)
            }
            None => {
                slots.insert(key.to_string(), Slot::plain(delta.to_string()));
                Ok(delta)
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let mut slots = self.lock()?;

        match Self::live(&mut slots, key) {
            Some(Slot {
                value: Value::Plain(raw),
                ..
            }) => Ok(Some(raw.clone())),
            Some(_) => Err(Self::wrong_type()),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let mut slots = self.lock()?;
        slots.insert(key.to_string(), Slot::plain(value));
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool, DomainError> {
        let mut slots = self.lock()?;
        Ok(Self::live(&mut slots, key).is_some() && slots.remove(key).is_some())
    }

    async fn hset(&self, hash: &str, field: &str, value: &str) -> Result<(), DomainError> {
        let mut slots = self.lock()?;

        match Self::live(&mut slots, hash) {
            Some(Slot {
                value: Value::Hash(fields),
                ..
            }) => {
                fields.insert(field.to_string(), value.to_string());
            }
            Some(_) => return Err(Self::wrong_type()),
            None => {
                let fields = HashMap::from([(field.to_string(), value.to_string())]);
                slots.insert(
                    hash.to_string(),
                    Slot {
                        value: Value::Hash(fields),
                        expires_at: None,
                    },
                );
            }
        }

        Ok(())
    }

    async fn hget(&self, hash: &str, field: &str) -> Result<Option<String>, DomainError> {
        let mut slots = self.lock()?;

        match Self::live(&mut slots, hash) {
            Some(Slot {
                value: Value::Hash(fields),
                ..
            }) => Ok(fields.get(field).cloned()),
            Some(_) => Err(Self::wrong_type()),
            None => Ok(None),
        }
    }

    async fn hdel(&self, hash: &str, field: &str) -> Result<bool, DomainError> {
        let mut slots = self.lock()?;

        let (removed, now_empty) = match Self::live(&mut slots, hash) {
            Some(Slot {
                value: Value::Hash(fields),
                ..
            }) => (fields.remove(field).is_some(), fields.is_empty()),
            Some(_) => return Err(Self::wrong_type()),
            None => (false, false),
        };

        // empty hashes do not exist
        if now_empty {
            slots.remove(hash);
        }

        Ok(removed)
    }

    async fn hexists(&self, hash: &str, field: &str) -> Result<bool, DomainError> {
        Ok(self.hget(hash, field).await?.is_some())
    }

    async fn hkeys(&self, hash: &str) -> Result<Vec<String>, DomainError> {
        let mut slots = self.lock()?;

        match Self::live(&mut slots, hash) {
            Some(Slot {
                value: Value::Hash(fields),
                ..
            }) => Ok(fields.keys().cloned().collect()),
            Some(_) => Err(Self::wrong_type()),
            None => Ok(Vec::new()),
        }
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, DomainError> {
        let mut slots = self.lock()?;
        Self::add(&mut slots, key, delta)
    }

    async fn decr(&self, key: &str) -> Result<i64, DomainError> {
        let mut slots = self.lock()?;
        Self::add(&mut slots, key, -1)
    }

    async fn expire_at(&self, key: &str, at: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut slots = self.lock()?;

        if Self::live(&mut slots, key).is_none() {
            return Ok(false);
        }

        if at <= Utc::now() {
            slots.remove(key);
        } else if let Some(slot) = slots.get_mut(key) {
            slot.expires_at = Some(at);
        }

        Ok(true)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        let mut slots = self.lock()?;

        let remaining = Self::live(&mut slots, key)
            .and_then(|slot| slot.expires_at)
            .and_then(|at| (at - Utc::now()).to_std().ok());

        Ok(remaining)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.lock().map(|_| ())
    }
}

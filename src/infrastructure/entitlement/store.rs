//! Time-bounded use counters per provisioned key

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tracing::{debug, info, warn};

use crate::domain::{
    evaluate_counter, DomainError, Entitlement, EntitlementStatus, KeySpace,
    KeyValueStore, KeyValueStoreExt, Secret,
};
use crate::infrastructure::key::KeyRegistry;

/// Entitlement counters backed by the shared store
///
/// A counter key with an absolute expiry. The key disappearing (TTL passed or
/// cleared) means "expired"; a value of zero or below means "quota exhausted".
#[derive(Clone)]
pub struct EntitlementStore {
    store: Arc<dyn KeyValueStore>,
    keyspace: KeySpace,
    registry: KeyRegistry,
}

impl std::fmt::Debug for EntitlementStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitlementStore")
            .field("keyspace", &self.keyspace)
            .finish()
    }
}

impl EntitlementStore {
    pub fn new(store: Arc<dyn KeyValueStore>, registry: KeyRegistry) -> Self {
        Self {
            keyspace: registry.keyspace().clone(),
            store,
            registry,
        }
    }

    /// Overwrite the entitlement of a provisioned key
    ///
    /// The counter is written first and the expiry second, as two separate
    /// commands. If the expiry cannot be set the counter is deleted again, so a
    /// failed call never leaves an entitlement without a TTL. A TTL of zero
    /// days expires the entitlement immediately.
    pub async fn set_entitlement(
        &self,
        secret: &Secret,
        remaining_uses: i64,
        ttl_days: i64,
    ) -> Result<Entitlement, DomainError> {
        if ttl_days < 0 {
            return Err(DomainError::malformed_input("ttl days must not be negative"));
        }

        let expires_at = TimeDelta::try_days(ttl_days)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| DomainError::malformed_input("ttl days out of range"))?;

        self.registry.require_provisioned(secret).await?;

        let key = self.keyspace.entitlement_key(secret);
        self.store.set(&key, &remaining_uses.to_string()).await?;
        if let Err(e) = self.store.expire_at(&key, expires_at).await {
            if let Err(rollback) = self.store.del(&key).await {
                warn!(
                    key = %secret.redacted(),
                    error = %rollback,
                    "Failed to remove entitlement counter after expiry error"
                );
            }
            return Err(e);
        }

        info!(
            key = %secret.redacted(),
            remaining_uses,
            expires_at = %expires_at,
            "Entitlement set"
        );

        Ok(Entitlement {
            remaining_uses,
            expires_at,
        })
    }

    /// Time left before the entitlement lapses, zero when absent
    pub async fn remaining_ttl(&self, secret: &Secret) -> Result<Duration, DomainError> {
        let ttl = self
            .store
            .ttl(&self.keyspace.entitlement_key(secret))
            .await?;

        Ok(ttl.unwrap_or(Duration::ZERO))
    }

    /// Raw counter value; an absent counter reads as zero
    pub async fn remaining_uses(&self, secret: &Secret) -> Result<i64, DomainError> {
        let count = self
            .store
            .get_int(&self.keyspace.entitlement_key(secret))
            .await?;

        Ok(count.unwrap_or(0))
    }

    pub async fn is_entitled(&self, secret: &Secret) -> Result<bool, DomainError> {
        match self.check_entitled(secret).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_entitled() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Quota-gated check, returning the remaining uses when entitled
    pub async fn check_entitled(&self, secret: &Secret) -> Result<i64, DomainError> {
        let counter = self
            .store
            .get_int(&self.keyspace.entitlement_key(secret))
            .await?;

        evaluate_counter(counter)
    }

    /// Decrement the counter by one, without a floor
    ///
    /// Not paired atomically with any earlier check: concurrent callers that
    /// all passed a check can drive the counter below zero.
    pub async fn consume(&self, secret: &Secret) -> Result<i64, DomainError> {
        let remaining = self
            .store
            .decr(&self.keyspace.entitlement_key(secret))
            .await?;

        debug!(key = %secret.redacted(), remaining, "Entitlement consumed");
        Ok(remaining)
    }

    /// Drop the counter, ending the entitlement immediately
    pub async fn clear(&self, secret: &Secret) -> Result<(), DomainError> {
        secret.require_canonical()?;

        let removed = self
            .store
            .del(&self.keyspace.entitlement_key(secret))
            .await?;

        info!(key = %secret.redacted(), removed, "Entitlement cleared");
        Ok(())
    }

    pub async fn status(&self, secret: &Secret) -> Result<EntitlementStatus, DomainError> {
        Ok(EntitlementStatus {
            remaining_uses: self.remaining_uses(secret).await?,
            remaining_ttl: self.remaining_ttl(secret).await?,
        })
    }
}

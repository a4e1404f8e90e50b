//! Per-route quota counters

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{
    validate_route, DomainError, KeySpace, KeyValueStore, KeyValueStoreExt, RouteQuotaSnapshot,
    Secret,
};
use crate::infrastructure::key::KeyRegistry;

/// Remaining and cumulative counters per `(route, key)`
///
/// The cumulative counter is only ever raised by grants. Consumption touches
/// the remaining counter alone.
#[derive(Clone)]
pub struct RouteQuota {
    store: Arc<dyn KeyValueStore>,
    registry: KeyRegistry,
}

impl std::fmt::Debug for RouteQuota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteQuota").finish_non_exhaustive()
    }
}

impl RouteQuota {
    pub fn new(store: Arc<dyn KeyValueStore>, registry: KeyRegistry) -> Self {
        Self { store, registry }
    }

    /// Top up both counters by `count`
    ///
    /// Grants are additive: granting 10 on top of 3 remaining leaves 13.
    pub async fn grant(
        &self,
        route: &str,
        secret: &Secret,
        count: i64,
    ) -> Result<RouteQuotaSnapshot, DomainError> {
        self.check_grant(route, secret).await?;

        let remaining = self
            .store
            .incr_by(&KeySpace::route_remaining_key(route, secret), count)
            .await?;
        let cumulative = self
            .store
            .incr_by(&KeySpace::route_cumulative_key(route, secret), count)
            .await?;

        info!(key = %secret.redacted(), route, count, remaining, "Route quota granted");

        Ok(RouteQuotaSnapshot {
            route: route.to_string(),
            remaining,
            cumulative,
        })
    }

    /// Raise the cumulative counter only
    pub async fn grant_cumulative_only(
        &self,
        route: &str,
        secret: &Secret,
        count: i64,
    ) -> Result<i64, DomainError> {
        self.check_grant(route, secret).await?;

        let cumulative = self
            .store
            .incr_by(&KeySpace::route_cumulative_key(route, secret), count)
            .await?;

        info!(key = %secret.redacted(), route, count, cumulative, "Cumulative route quota granted");
        Ok(cumulative)
    }

    /// Remaining uses; absent reads as zero, negatives are returned as-is
    pub async fn remaining(&self, route: &str, secret: &Secret) -> Result<i64, DomainError> {
        let remaining = self
            .store
            .get_int(&KeySpace::route_remaining_key(route, secret))
            .await?;

        Ok(remaining.unwrap_or(0))
    }

    pub async fn cumulative(&self, route: &str, secret: &Secret) -> Result<i64, DomainError> {
        let cumulative = self
            .store
            .get_int(&KeySpace::route_cumulative_key(route, secret))
            .await?;

        Ok(cumulative.unwrap_or(0))
    }

    /// Fails with `RouteQuotaExhausted` unless uses remain on the route
    pub async fn check_available(&self, route: &str, secret: &Secret) -> Result<i64, DomainError> {
        let remaining = self.remaining(route, secret).await?;

        if remaining > 0 {
            Ok(remaining)
        } else {
            Err(DomainError::route_quota_exhausted(route))
        }
    }

    /// Unconditional decrement, with the same race as entitlement consumption
    pub async fn consume(&self, route: &str, secret: &Secret) -> Result<i64, DomainError> {
        let remaining = self
            .store
            .decr(&KeySpace::route_remaining_key(route, secret))
            .await?;

        debug!(key = %secret.redacted(), route, remaining, "Route quota consumed");
        Ok(remaining)
    }

    pub async fn snapshot(
        &self,
        route: &str,
        secret: &Secret,
    ) -> Result<RouteQuotaSnapshot, DomainError> {
        Ok(RouteQuotaSnapshot {
            route: route.to_string(),
            remaining: self.remaining(route, secret).await?,
            cumulative: self.cumulative(route, secret).await?,
        })
    }

    async fn check_grant(&self, route: &str, secret: &Secret) -> Result<(), DomainError> {
        validate_route(route)?;
        self.registry.require_provisioned(secret).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::testing::{canonical_secret, in_memory_store};

    async fn quota_with_key(seed: u32) -> (RouteQuota, Secret) {
        let store = in_memory_store();
        let registry = KeyRegistry::new(store.clone(), KeySpace::default());
        let secret = canonical_secret(seed);
        registry.provision(Some(secret.clone()), "svc").await.unwrap();

        (RouteQuota::new(store, registry), secret)
    }

    #[tokio::test]
    async fn test_absent_counters_read_zero() {
        let (quota, secret) = quota_with_key(1).await;

        let snapshot = quota.snapshot("/v1", &secret).await.unwrap();
        assert_eq!(snapshot.remaining, 0);
        assert_eq!(snapshot.cumulative, 0);
        assert!(matches!(
            quota.check_available("/v1", &secret).await,
            Err(DomainError::RouteQuotaExhausted { .. })
        ));
    }

    #[tokio::test]
    async fn test_grant_is_additive() {
        let (quota, secret) = quota_with_key(2).await;

        quota.grant("/v1", &secret, 3).await.unwrap();
        quota.consume("/v1", &secret).await.unwrap();
        let snapshot = quota.grant("/v1", &secret, 10).await.unwrap();

        assert_eq!(snapshot.remaining, 12);
        assert_eq!(snapshot.cumulative, 13);
    }

    #[tokio::test]
    async fn test_cumulative_only_grant_leaves_remaining() {
        let (quota, secret) = quota_with_key(3).await;

        quota.grant("/v1", &secret, 2).await.unwrap();
        assert_eq!(quota.grant_cumulative_only("/v1", &secret, 5).await.unwrap(), 7);
        assert_eq!(quota.remaining("/v1", &secret).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_consume_never_touches_cumulative_and_goes_negative() {
        let (quota, secret) = quota_with_key(4).await;
        quota.grant("/v1", &secret, 1).await.unwrap();

        assert_eq!(quota.check_available("/v1", &secret).await.unwrap(), 1);
        quota.consume("/v1", &secret).await.unwrap();
        quota.consume("/v1", &secret).await.unwrap();

        assert_eq!(quota.remaining("/v1", &secret).await.unwrap(), -1);
        assert_eq!(quota.cumulative("/v1", &secret).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_routes_are_independent() {
        let (quota, secret) = quota_with_key(5).await;
        quota.grant("/v1", &secret, 4).await.unwrap();

        assert_eq!(quota.remaining("/v1/items", &secret).await.unwrap(), 0);
        assert_eq!(quota.remaining("/v2", &secret).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_grant_preconditions() {
        let (quota, secret) = quota_with_key(6).await;

        assert!(matches!(
            quota.grant("", &secret, 1).await,
            Err(DomainError::MalformedInput { .. })
        ));
        assert!(matches!(
            quota.grant("/v1", &canonical_secret(99), 1).await,
            Err(DomainError::NotProvisioned { .. })
        ));
        assert!(matches!(
            quota.grant_cumulative_only("/v1", &canonical_secret(99), 1).await,
            Err(DomainError::NotProvisioned { .. })
        ));
        assert_eq!(quota.cumulative("/v1", &canonical_secret(99)).await.unwrap(), 0);
    }
}

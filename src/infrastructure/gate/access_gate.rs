//! Authorization levels composed from the registry, entitlements, route
//! quotas and tokens

use tracing::debug;

use crate::domain::{DomainError, Principal, Secret, TokenRecord};
use crate::infrastructure::entitlement::EntitlementStore;
use crate::infrastructure::key::KeyRegistry;
use crate::infrastructure::quota::RouteQuota;
use crate::infrastructure::token::TokenAuthority;

/// Entry checks run before every operation
///
/// Checks only read. Mutations that follow a passed check are separate calls
/// and are not atomic with it.
#[derive(Debug, Clone)]
pub struct AccessGate {
    registry: KeyRegistry,
    entitlements: EntitlementStore,
    quota: RouteQuota,
    tokens: TokenAuthority,
}

impl AccessGate {
    pub fn new(
        registry: KeyRegistry,
        entitlements: EntitlementStore,
        quota: RouteQuota,
        tokens: TokenAuthority,
    ) -> Self {
        Self {
            registry,
            entitlements,
            quota,
            tokens,
        }
    }

    /// Secret must belong to the management set
    pub async fn management(&self, secret: &Secret) -> Result<Principal, DomainError> {
        if self.registry.is_management(secret).await? {
            Ok(Principal::management(secret.clone()))
        } else {
            debug!(key = %secret.redacted(), "Management access denied");
            Err(DomainError::access_denied("management key required"))
        }
    }

    /// Secret must be provisioned and currently entitled
    pub async fn key(&self, secret: &Secret) -> Result<Principal, DomainError> {
        let principal = self.provisioned(secret).await?;
        self.entitlements.check_entitled(secret).await?;
        Ok(principal)
    }

    /// Secret must be provisioned with uses left on `route`
    pub async fn key_for_route(&self, secret: &Secret, route: &str) -> Result<Principal, DomainError> {
        let principal = self.provisioned(secret).await?;
        self.quota.check_available(route, secret).await?;
        Ok(principal)
    }

    /// Bearer token must verify for `route`
    pub async fn token(&self, raw: &str, route: &str) -> Result<TokenRecord, DomainError> {
        self.tokens.verify(raw, route).await
    }

    async fn provisioned(&self, secret: &Secret) -> Result<Principal, DomainError> {
        if secret.is_empty() {
            return Err(DomainError::access_denied("missing key"));
        }

        if self.registry.exists(secret).await? {
            Ok(Principal::provisioned(secret.clone()))
        } else {
            debug!(key = %secret.redacted(), "Key access denied");
            Err(DomainError::access_denied("key is not provisioned"))
        }
    }
}

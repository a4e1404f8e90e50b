//! Application state for shared services

use std::sync::Arc;

use crate::domain::{KeySpace, KeyValueStore};
use crate::infrastructure::entitlement::EntitlementStore;
use crate::infrastructure::gate::AccessGate;
use crate::infrastructure::key::KeyRegistry;
use crate::infrastructure::quota::RouteQuota;
use crate::infrastructure::token::{TokenAuthority, TokenCache, TokenCacheConfig};

/// Application state shared by every handler
///
/// Services are stateless views over the shared store, except the token
/// cache held by the token authority.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub registry: Arc<KeyRegistry>,
    pub entitlements: Arc<EntitlementStore>,
    pub quota: Arc<RouteQuota>,
    pub tokens: Arc<TokenAuthority>,
    pub gate: Arc<AccessGate>,
}

impl AppState {
    /// Wire every service over one store
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        keyspace: KeySpace,
        token_cache: &TokenCacheConfig,
    ) -> Self {
        let registry = KeyRegistry::new(store.clone(), keyspace);
        let entitlements = EntitlementStore::new(store.clone(), registry.clone());
        let quota = RouteQuota::new(store.clone(), registry.clone());
        let tokens = TokenAuthority::new(
            registry.clone(),
            entitlements.clone(),
            TokenCache::new(token_cache),
        );
        let gate = AccessGate::new(
            registry.clone(),
            entitlements.clone(),
            quota.clone(),
            tokens.clone(),
        );

        Self {
            store,
            registry: Arc::new(registry),
            entitlements: Arc::new(entitlements),
            quota: Arc::new(quota),
            tokens: Arc::new(tokens),
            gate: Arc::new(gate),
        }
    }
}

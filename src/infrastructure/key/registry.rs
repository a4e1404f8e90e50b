//! Provisioned and management key sets

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{
    ApiKeyRecord, DomainError, KeySpace, KeyValueStore, ManagementKey, Secret, MANAGEMENT_HASH,
    PROVISIONED_HASH,
};

use super::generator::SecretGenerator;

/// Registry of provisioned keys and their labels
///
/// Management keys live in a separate hash and are only ever written by the
/// out-of-band bootstrap path.
#[derive(Clone)]
pub struct KeyRegistry {
    store: Arc<dyn KeyValueStore>,
    keyspace: KeySpace,
    generator: SecretGenerator,
}

impl std::fmt::Debug for KeyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRegistry")
            .field("keyspace", &self.keyspace)
            .finish()
    }
}

impl KeyRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>, keyspace: KeySpace) -> Self {
        Self {
            store,
            keyspace,
            generator: SecretGenerator::new(),
        }
    }

    pub fn keyspace(&self) -> &KeySpace {
        &self.keyspace
    }

    /// Provision a key, generating a fresh secret when none of canonical
    /// length is supplied
    ///
    /// An existing key keeps working and only has its label overwritten.
    /// A management secret is never admitted to the provisioned set.
    pub async fn provision(
        &self,
        secret: Option<Secret>,
        label: impl Into<String>,
    ) -> Result<ApiKeyRecord, DomainError> {
        let label = label.into();

        let secret = match secret {
            Some(secret) if secret.is_canonical() => {
                if self.is_management(&secret).await? {
                    return Err(DomainError::malformed_input(
                        "secret is already a management key",
                    ));
                }
                secret
            }
            _ => self.generator.generate(),
        };

        self.store
            .hset(PROVISIONED_HASH, &self.keyspace.registry_field(&secret), &label)
            .await?;

        info!(key = %secret.redacted(), label = %label, "Provisioned API key");

        Ok(ApiKeyRecord::new(secret, label))
    }

    /// Remove a key from the provisioned set
    ///
    /// Idempotent. Entitlement and route counters are left in place but become
    /// unreachable through any gate.
    pub async fn revoke(&self, secret: &Secret) -> Result<(), DomainError> {
        secret.require_canonical()?;

        let removed = self
            .store
            .hdel(PROVISIONED_HASH, &self.keyspace.registry_field(secret))
            .await?;

        info!(key = %secret.redacted(), removed, "Revoked API key");
        Ok(())
    }

    /// All provisioned secrets in this namespace, management keys excluded
    pub async fn list(&self) -> Result<Vec<Secret>, DomainError> {
        let fields = self.store.hkeys(PROVISIONED_HASH).await?;
        let management: HashSet<String> =
            self.store.hkeys(MANAGEMENT_HASH).await?.into_iter().collect();

        let mut secrets: Vec<Secret> = fields
            .iter()
            .filter_map(|field| self.keyspace.secret_from_field(field))
            .filter(|secret| !management.contains(secret.as_str()))
            .collect();
        secrets.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        debug!(count = secrets.len(), "Listed API keys");
        Ok(secrets)
    }

    pub async fn exists(&self, secret: &Secret) -> Result<bool, DomainError> {
        self.store
            .hexists(PROVISIONED_HASH, &self.keyspace.registry_field(secret))
            .await
    }

    /// Label of a provisioned key
    pub async fn label(&self, secret: &Secret) -> Result<String, DomainError> {
        self.store
            .hget(PROVISIONED_HASH, &self.keyspace.registry_field(secret))
            .await?
            .ok_or_else(|| DomainError::not_found("API key not found"))
    }

    /// Fails with `NotProvisioned` unless the key is in the provisioned set
    pub async fn require_provisioned(&self, secret: &Secret) -> Result<(), DomainError> {
        if self.exists(secret).await? {
            Ok(())
        } else {
            Err(DomainError::not_provisioned("API key is not provisioned"))
        }
    }

    pub async fn is_management(&self, secret: &Secret) -> Result<bool, DomainError> {
        if secret.is_empty() {
            return Ok(false);
        }

        self.store.hexists(MANAGEMENT_HASH, secret.as_str()).await
    }

    /// Add a management key. Only the bootstrap CLI calls this.
    pub async fn register_management(&self, key: &ManagementKey) -> Result<(), DomainError> {
        if key.secret.is_empty() {
            return Err(DomainError::malformed_input("management key must not be empty"));
        }

        if self.exists(&key.secret).await? {
            return Err(DomainError::malformed_input(
                "secret is already a provisioned key",
            ));
        }

        self.store
            .hset(MANAGEMENT_HASH, key.secret.as_str(), &key.label)
            .await?;

        info!(key = %key.secret.redacted(), label = %key.label, "Registered management key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::store::MockKeyValueStore;
    use crate::infrastructure::testing::{canonical_secret, in_memory_store};

    fn registry() -> KeyRegistry {
        KeyRegistry::new(in_memory_store(), KeySpace::default())
    }

    #[tokio::test]
    async fn test_provision_supplied_secret() {
        let registry = registry();
        let secret = canonical_secret(1);

        let record = registry.provision(Some(secret.clone()), "svc").await.unwrap();

        assert_eq!(record.secret, secret);
        assert_eq!(record.label, "svc");
        assert!(registry.exists(&secret).await.unwrap());
        assert_eq!(registry.label(&secret).await.unwrap(), "svc");
    }

    #[tokio::test]
    async fn test_provision_generates_for_short_or_missing_secret() {
        let registry = registry();

        let generated = registry.provision(None, "a").await.unwrap();
        assert!(generated.secret.is_canonical());

        let replaced = registry
            .provision(Some(Secret::new("short")), "b")
            .await
            .unwrap();
        assert_ne!(replaced.secret.as_str(), "short");
        assert!(replaced.secret.is_canonical());
        assert!(!registry.exists(&Secret::new("short")).await.unwrap());
    }

    #[tokio::test]
    async fn test_provision_twice_overwrites_label() {
        let registry = registry();
        let secret = canonical_secret(2);

        registry.provision(Some(secret.clone()), "old").await.unwrap();
        registry.provision(Some(secret.clone()), "new").await.unwrap();

        assert_eq!(registry.label(&secret).await.unwrap(), "new");
        assert_eq!(registry.list().await.unwrap(), vec![secret]);
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let registry = registry();
        let secret = canonical_secret(3);
        registry.provision(Some(secret.clone()), "svc").await.unwrap();

        registry.revoke(&secret).await.unwrap();
        registry.revoke(&secret).await.unwrap();

        assert!(!registry.exists(&secret).await.unwrap());
        assert!(matches!(
            registry.label(&secret).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_revoke_rejects_placeholder() {
        let result = registry().revoke(&Secret::new("abc")).await;
        assert!(matches!(result, Err(DomainError::MalformedInput { .. })));
    }

    #[tokio::test]
    async fn test_list_respects_namespace() {
        let store = in_memory_store();
        let ours = KeyRegistry::new(store.clone(), KeySpace::new("a:"));
        let theirs = KeyRegistry::new(store, KeySpace::new("b:"));

        ours.provision(Some(canonical_secret(4)), "x").await.unwrap();
        theirs.provision(Some(canonical_secret(5)), "y").await.unwrap();

        assert_eq!(ours.list().await.unwrap(), vec![canonical_secret(4)]);
        assert!(!ours.exists(&canonical_secret(5)).await.unwrap());
    }

    #[tokio::test]
    async fn test_management_set_is_disjoint() {
        let registry = registry();
        let admin = canonical_secret(6);

        registry
            .register_management(&ManagementKey::new(admin.clone(), "ops"))
            .await
            .unwrap();

        assert!(registry.is_management(&admin).await.unwrap());
        assert!(!registry.exists(&admin).await.unwrap());
        assert!(registry.list().await.unwrap().is_empty());
        assert!(matches!(
            registry.require_provisioned(&admin).await,
            Err(DomainError::NotProvisioned { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_secret_is_never_management() {
        assert!(!registry().is_management(&Secret::new("")).await.unwrap());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_hexists()
            .returning(|_, _| Err(DomainError::store_unavailable("HEXISTS failed")));

        let registry = KeyRegistry::new(Arc::new(store), KeySpace::default());
        let result = registry.require_provisioned(&canonical_secret(7)).await;

        assert!(matches!(result, Err(DomainError::StoreUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_management_secret_cannot_be_provisioned() {
        let registry = registry();
        let admin = canonical_secret(8);
        registry
            .register_management(&ManagementKey::new(admin.clone(), "ops"))
            .await
            .unwrap();

        let result = registry.provision(Some(admin.clone()), "svc").await;

        assert!(matches!(result, Err(DomainError::MalformedInput { .. })));
        assert!(!registry.exists(&admin).await.unwrap());
    }

    #[tokio::test]
    async fn test_provisioned_secret_cannot_become_management() {
        let registry = registry();
        let secret = canonical_secret(9);
        registry.provision(Some(secret.clone()), "svc").await.unwrap();

        let result = registry
            .register_management(&ManagementKey::new(secret.clone(), "ops"))
            .await;

        assert!(matches!(result, Err(DomainError::MalformedInput { .. })));
        assert!(!registry.is_management(&secret).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_skips_management_fields() {
        let store = in_memory_store();
        let registry = KeyRegistry::new(store.clone(), KeySpace::default());
        let admin = canonical_secret(10);
        let svc = canonical_secret(11);

        // a store written before the sets were kept apart
        store
            .hset(PROVISIONED_HASH, admin.as_str(), "legacy")
            .await
            .unwrap();
        store
            .hset(MANAGEMENT_HASH, admin.as_str(), "ops")
            .await
            .unwrap();
        registry.provision(Some(svc.clone()), "svc").await.unwrap();

        assert_eq!(registry.list().await.unwrap(), vec![svc]);
    }
}

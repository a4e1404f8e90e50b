//! Store key layout

use crate::domain::identity::Secret;

/// Hash holding provisioned keys: `prefix+secret → label`
pub const PROVISIONED_HASH: &str = "keys";

/// Hash holding management keys: `secret → label`
pub const MANAGEMENT_HASH: &str = "mkeys";

/// Derives every store key used by the service
///
/// Provisioned keys and their entitlement counters are namespaced by a
/// configurable prefix. Route quota keys depend only on `(route, secret)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySpace {
    prefix: String,
}

impl KeySpace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Field of a provisioned key inside [`PROVISIONED_HASH`]
    pub fn registry_field(&self, secret: &Secret) -> String {
        format!("{}{}", self.prefix, secret.as_str())
    }

    /// Plain key holding the entitlement counter and its expiry
    pub fn entitlement_key(&self, secret: &Secret) -> String {
        self.registry_field(secret)
    }

    /// Recover the secret from a registry field, if it belongs to this namespace
    pub fn secret_from_field(&self, field: &str) -> Option<Secret> {
        field.strip_prefix(self.prefix.as_str()).map(Secret::from)
    }

    pub fn route_remaining_key(route: &str, secret: &Secret) -> String {
        format!("{}-{}", route, secret.as_str())
    }

    pub fn route_cumulative_key(route: &str, secret: &Secret) -> String {
        format!("{}-total-{}", route, secret.as_str())
    }
}

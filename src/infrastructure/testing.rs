//! Shared fixtures for unit tests

use std::sync::Arc;

use crate::domain::{KeyValueStore, Secret};

use super::store::InMemoryStore;

/// A canonical-length decimal secret, distinct per seed
pub fn canonical_secret(seed: u32) -> Secret {
    Secret::new(format!("1{:070}", seed))
}

pub fn in_memory_store() -> Arc<dyn KeyValueStore> {
    Arc::new(InMemoryStore::new())
}

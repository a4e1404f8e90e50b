//! Store domain - the atomic key-value capability and its key layout

mod keys;
mod repository;

pub use keys::{KeySpace, MANAGEMENT_HASH, PROVISIONED_HASH};
pub use repository::{KeyValueStore, KeyValueStoreExt};

#[cfg(test)]
pub use repository::MockKeyValueStore;

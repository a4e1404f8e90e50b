//! Store infrastructure - key-value store backends

mod factory;
mod in_memory;
mod redis;

pub use factory::{StoreConfig, StoreFactory, StoreType};
pub use in_memory::InMemoryStore;
pub use self::redis::{RedisStore, RedisStoreConfig};

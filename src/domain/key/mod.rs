//! Key domain - provisioned keys, management keys and resolved callers

mod entity;

pub use entity::{ApiKeyRecord, ManagementKey, Principal, Role};

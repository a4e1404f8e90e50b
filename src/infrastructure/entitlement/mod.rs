//! Entitlement infrastructure

mod store;

pub use store::EntitlementStore;

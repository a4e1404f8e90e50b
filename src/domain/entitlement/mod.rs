//! Entitlement domain - time-bounded use counters per key

mod entity;

pub use entity::{evaluate_counter, Entitlement, EntitlementStatus};

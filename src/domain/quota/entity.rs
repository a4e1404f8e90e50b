//! Per-route quota counters

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Remaining and cumulative counters for one `(route, key)` pair
///
/// Absent counters read as zero. Negative values are reported as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteQuotaSnapshot {
    pub route: String,
    pub remaining: i64,
    pub cumulative: i64,
}

pub fn validate_route(route: &str) -> Result<(), DomainError> {
    if route.is_empty() {
        return Err(DomainError::malformed_input("route must not be empty"));
    }
    Ok(())
}

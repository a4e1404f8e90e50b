//! Entitlement counters

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, EntitlementLapse};

/// Entitlement as written by a grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub remaining_uses: i64,
    pub expires_at: DateTime<Utc>,
}

/// Point-in-time view of an entitlement
///
/// A missing or expired counter reads as zero uses and zero TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitlementStatus {
    pub remaining_uses: i64,
    pub remaining_ttl: Duration,
}

impl EntitlementStatus {
    pub fn is_entitled(&self) -> bool {
        self.remaining_uses > 0 && !self.remaining_ttl.is_zero()
    }
}

/// Classify a raw counter read
///
/// `None` means the counter key is absent (never granted, cleared or past its
/// expiry). Returns the positive remaining count when entitled.
pub fn evaluate_counter(counter: Option<i64>) -> Result<i64, DomainError> {
    match counter {
        None => Err(DomainError::NotEntitled(EntitlementLapse::Expired)),
        Some(n) if n <= 0 => Err(DomainError::NotEntitled(EntitlementLapse::QuotaExhausted)),
        Some(n) => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_counter() {
        assert_eq!(evaluate_counter(Some(3)).unwrap(), 3);
        assert!(matches!(
            evaluate_counter(None),
            Err(DomainError::NotEntitled(EntitlementLapse::Expired))
        ));
        assert!(matches!(
            evaluate_counter(Some(0)),
            Err(DomainError::NotEntitled(EntitlementLapse::QuotaExhausted))
        ));
        assert!(matches!(
            evaluate_counter(Some(-2)),
            Err(DomainError::NotEntitled(EntitlementLapse::QuotaExhausted))
        ));
    }

    #[test]
    fn test_status_is_entitled() {
        let live = EntitlementStatus {
            remaining_uses: 1,
            remaining_ttl: Duration::from_secs(60),
        };
        let drained = EntitlementStatus {
            remaining_uses: 0,
            ..live
        };
        assert!(live.is_entitled());
        assert!(!drained.is_entitled());
    }
}

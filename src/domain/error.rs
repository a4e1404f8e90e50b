use std::fmt;

use thiserror::Error;

/// Why an identity is currently not entitled to consume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitlementLapse {
    /// The entitlement counter is absent or its TTL has passed
    Expired,
    /// The counter exists but holds no remaining uses
    QuotaExhausted,
}

impl fmt::Display for EntitlementLapse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "entitlement expired"),
            Self::QuotaExhausted => write!(f, "quota of use exceeded"),
        }
    }
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    #[error("Not provisioned: {message}")]
    NotProvisioned { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Token not found")]
    TokenNotFound,

    #[error("Not entitled: {0}")]
    NotEntitled(EntitlementLapse),

    #[error("Route quota exhausted: {route}")]
    RouteQuotaExhausted { route: String },

    #[error("Route denied: token scoped to '{authorized}' cannot access '{requested}'")]
    RouteDenied {
        authorized: String,
        requested: String,
    },

    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    #[error("Malformed signature: {message}")]
    MalformedSignature { message: String },

    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    pub fn not_provisioned(message: impl Into<String>) -> Self {
        Self::NotProvisioned {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn route_quota_exhausted(route: impl Into<String>) -> Self {
        Self::RouteQuotaExhausted {
            route: route.into(),
        }
    }

    pub fn route_denied(authorized: impl Into<String>, requested: impl Into<String>) -> Self {
        Self::RouteDenied {
            authorized: authorized.into(),
            requested: requested.into(),
        }
    }

    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    pub fn malformed_signature(message: impl Into<String>) -> Self {
        Self::MalformedSignature {
            message: message.into(),
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for both entitlement lapses (expired TTL or exhausted count)
    pub fn is_not_entitled(&self) -> bool {
        matches!(self, Self::NotEntitled(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_error() {
        let error = DomainError::access_denied("management key required");
        assert_eq!(error.to_string(), "Access denied: management key required");
    }

    #[test]
    fn test_not_entitled_messages() {
        let expired = DomainError::NotEntitled(EntitlementLapse::Expired);
        let exhausted = DomainError::NotEntitled(EntitlementLapse::QuotaExhausted);

        assert_eq!(expired.to_string(), "Not entitled: entitlement expired");
        assert_eq!(exhausted.to_string(), "Not entitled: quota of use exceeded");
        assert!(expired.is_not_entitled());
        assert!(!DomainError::TokenNotFound.is_not_entitled());
    }

    #[test]
    fn test_route_denied_error() {
        let error = DomainError::route_denied("/v1", "/v2/items");
        assert_eq!(
            error.to_string(),
            "Route denied: token scoped to '/v1' cannot access '/v2/items'"
        );
    }
}

//! Error envelope and the mapping from domain errors to status codes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::envelope::ResultStatus;
use crate::domain::{DomainError, EntitlementLapse};

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub status: ResultStatus,
    pub message: String,
    /// Machine-readable error kind
    pub code: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                status: ResultStatus::Error,
                message: message.into(),
                code: code.into(),
            },
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();

        match &err {
            DomainError::AccessDenied { .. } => {
                Self::new(StatusCode::FORBIDDEN, "access_denied", message)
            }
            DomainError::NotProvisioned { .. } => {
                Self::new(StatusCode::NOT_FOUND, "not_provisioned", message)
            }
            DomainError::NotFound { .. } => Self::new(StatusCode::NOT_FOUND, "not_found", message),
            DomainError::TokenNotFound => {
                Self::new(StatusCode::UNAUTHORIZED, "token_not_found", message)
            }
            DomainError::NotEntitled(EntitlementLapse::Expired) => {
                Self::new(StatusCode::FORBIDDEN, "expired", message)
            }
            DomainError::NotEntitled(EntitlementLapse::QuotaExhausted) => {
                Self::new(StatusCode::TOO_MANY_REQUESTS, "quota_exhausted", message)
            }
            DomainError::RouteQuotaExhausted { .. } => {
                Self::new(StatusCode::TOO_MANY_REQUESTS, "route_quota_exhausted", message)
            }
            DomainError::RouteDenied { .. } => {
                Self::new(StatusCode::FORBIDDEN, "route_denied", message)
            }
            DomainError::MalformedInput { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "malformed_input", message)
            }
            DomainError::MalformedSignature { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "malformed_signature", message)
            }
            DomainError::StoreUnavailable { .. } => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", message)
            }
            DomainError::Configuration { .. } | DomainError::Internal { .. } => {
                Self::internal(message)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.response.code, self.response.message)
    }
}

impl std::error::Error for ApiError {}

//! Extractors for the three authorization levels

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::{DomainError, Principal, Secret, TokenRecord};

/// Header carrying the caller's raw secret
pub const KEY_HEADER: &str = "key";

/// Header carrying a bearer token
pub const TOKEN_HEADER: &str = "token";

/// Requires a management key
#[derive(Debug, Clone)]
pub struct RequireManagement(pub Principal);

/// Requires a provisioned, currently entitled key
#[derive(Debug, Clone)]
pub struct RequireKey(pub Principal);

/// Requires a bearer token valid for the request path
///
/// Carries the presented token next to its cached record so handlers can
/// recover the signer from it.
#[derive(Debug, Clone)]
pub struct RequireToken {
    pub record: TokenRecord,
    pub token: String,
}

impl FromRequestParts<AppState> for RequireManagement {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let secret = presented_key(&parts.headers)?;
        let principal = state.gate.management(&secret).await?;

        debug!(key = %secret.redacted(), "Management access granted");
        Ok(RequireManagement(principal))
    }
}

impl FromRequestParts<AppState> for RequireKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let secret = presented_key(&parts.headers)?;
        Ok(RequireKey(state.gate.key(&secret).await?))
    }
}

impl FromRequestParts<AppState> for RequireToken {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = presented_token(parts)?;
        let record = state.gate.token(&raw, parts.uri.path()).await?;

        Ok(RequireToken { record, token: raw })
    }
}

/// Raw secret from the `key` header, or `X-API-Key` as a fallback
pub fn presented_key(headers: &HeaderMap) -> Result<Secret, ApiError> {
    let value = headers
        .get(KEY_HEADER)
        .or_else(|| headers.get("x-api-key"))
        .ok_or_else(|| DomainError::access_denied("key header required"))?;

    let key = value
        .to_str()
        .map_err(|_| DomainError::malformed_input("invalid key header encoding"))?
        .trim();

    if key.is_empty() {
        return Err(DomainError::access_denied("key header required").into());
    }

    Ok(Secret::new(key))
}

/// Token from the `token` header, or the `token` query parameter
fn presented_token(parts: &Parts) -> Result<String, ApiError> {
    if let Some(value) = parts.headers.get(TOKEN_HEADER) {
        let token = value
            .to_str()
            .map_err(|_| DomainError::malformed_input("invalid token header encoding"))?;

        return Ok(token.trim().to_string());
    }

    parts
        .uri
        .query()
        .and_then(|query| {
            query.split('&').find_map(|pair| match pair.split_once('=') {
                Some((TOKEN_HEADER, value)) => Some(value.to_string()),
                _ => None,
            })
        })
        .ok_or_else(|| DomainError::access_denied("token required").into())
}

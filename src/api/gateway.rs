//! Path-scoped token and metering endpoints
//!
//! Any path outside `/keymem`, `/health` and `/ready` is a protected route:
//! `PUT` mints a token scoped to it, `GET` checks a token against it and
//! `POST` meters one use of it with a key.

use axum::{
    extract::State,
    http::Uri,
    response::IntoResponse,
};
use serde::Serialize;
use tracing::info;

use crate::api::middleware::{RequireKey, RequireToken, TOKEN_HEADER};
use crate::api::state::AppState;
use crate::api::types::{ok, ApiError, Envelope, Json};

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Identity behind a verified token
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedTokenResponse {
    pub key: String,
    pub route: String,
    /// Address recovered from the token signature
    pub address: String,
}

/// Counters left after a metered call
#[derive(Debug, Clone, Serialize)]
pub struct MeteredResponse {
    pub route: String,
    pub number: i64,
    pub route_number: i64,
}

/// PUT /{path}: mint a token scoped to the request path
pub async fn mint_token(
    State(state): State<AppState>,
    RequireKey(principal): RequireKey,
    uri: Uri,
) -> Result<impl IntoResponse, ApiError> {
    let token = state.tokens.mint(&principal.secret, uri.path()).await?;
    let token = token.into_string();

    Ok((
        [(TOKEN_HEADER, token.clone())],
        ok(TokenResponse { token }),
    ))
}

/// GET /{path}: check a token from the `token` header or query parameter
pub async fn verify_token(
    State(state): State<AppState>,
    RequireToken { record, token }: RequireToken,
    uri: Uri,
) -> Result<Json<Envelope<VerifiedTokenResponse>>, ApiError> {
    let signer = state.tokens.recover_identity(&token)?;

    info!(
        key = %record.secret.redacted(),
        route = uri.path(),
        "Token accepted"
    );

    Ok(ok(VerifiedTokenResponse {
        key: record.secret.to_string(),
        route: record.route,
        address: signer.address().to_string(),
    }))
}

/// POST /{path}: spend one entitlement use and one route use
///
/// The availability checks and both decrements are separate store calls;
/// concurrent callers may drive either counter below zero.
pub async fn metered_access(
    State(state): State<AppState>,
    RequireKey(principal): RequireKey,
    uri: Uri,
) -> Result<Json<Envelope<MeteredResponse>>, ApiError> {
    let route = uri.path();
    state.gate.key_for_route(&principal.secret, route).await?;

    let number = state.entitlements.consume(&principal.secret).await?;
    let route_number = state.quota.consume(route, &principal.secret).await?;

    Ok(ok(MeteredResponse {
        route: route.to_string(),
        number,
        route_number,
    }))
}

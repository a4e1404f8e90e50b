//! Entitlement endpoints

use axum::extract::State;
use serde::{Deserialize, Serialize};

use super::expiry_from_ttl;
use super::keys::{KeyRequest, KeyResponse};
use crate::api::middleware::{RequireKey, RequireManagement};
use crate::api::state::AppState;
use crate::api::types::{ok, ApiError, Envelope, Json};
use crate::domain::Secret;

/// Request to set a key's entitlement
#[derive(Debug, Clone, Deserialize)]
pub struct EnableKeyRequest {
    pub key: String,
    /// Use count
    pub number: i64,
    /// TTL in days
    pub expday: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntitlementResponse {
    pub expdate: String,
    pub number: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpiryResponse {
    pub sec: u64,
    pub expdate: Option<String>,
}

/// POST /keymem/enable
pub async fn enable_key(
    State(state): State<AppState>,
    RequireManagement(_admin): RequireManagement,
    Json(request): Json<EnableKeyRequest>,
) -> Result<Json<Envelope<EntitlementResponse>>, ApiError> {
    let entitlement = state
        .entitlements
        .set_entitlement(&Secret::new(request.key), request.number, request.expday)
        .await?;

    Ok(ok(EntitlementResponse {
        expdate: entitlement.expires_at.to_rfc3339(),
        number: entitlement.remaining_uses,
    }))
}

/// POST /keymem/diskey
pub async fn disable_key(
    State(state): State<AppState>,
    RequireManagement(_admin): RequireManagement,
    Json(request): Json<KeyRequest>,
) -> Result<Json<Envelope<KeyResponse>>, ApiError> {
    let secret = Secret::new(request.key);
    state.entitlements.clear(&secret).await?;

    Ok(ok(KeyResponse {
        key: secret.to_string(),
    }))
}

/// GET /keymem/getkeyexpdate
pub async fn get_key_expiry(
    State(state): State<AppState>,
    RequireKey(principal): RequireKey,
) -> Result<Json<Envelope<ExpiryResponse>>, ApiError> {
    let ttl = state.entitlements.remaining_ttl(&principal.secret).await?;

    Ok(ok(ExpiryResponse {
        sec: ttl.as_secs(),
        expdate: expiry_from_ttl(ttl).map(|at| at.to_rfc3339()),
    }))
}

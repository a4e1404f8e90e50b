//! Provisioned key endpoints

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::expiry_from_ttl;
use crate::api::middleware::{RequireKey, RequireManagement};
use crate::api::state::AppState;
use crate::api::types::{ok, ApiError, Envelope, Json};
use crate::domain::{IdentityCodec, Secret};

/// Request to provision a key
#[derive(Debug, Clone, Deserialize)]
pub struct AddKeyRequest {
    /// Caller-chosen secret; generated when absent or too short
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// Request naming an existing key
#[derive(Debug, Clone, Deserialize)]
pub struct KeyRequest {
    pub key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionedKeyResponse {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyResponse {
    pub key: String,
}

/// Label and entitlement snapshot of a key
#[derive(Debug, Clone, Serialize)]
pub struct KeyInfoResponse {
    pub name: String,
    /// Remaining entitlement TTL in seconds
    pub sec: u64,
    pub expdate: Option<String>,
    /// Remaining uses
    pub number: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyListResponse {
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyAddressResponse {
    pub address: String,
    pub pubkey: String,
}

/// POST /keymem/addkey
pub async fn add_key(
    State(state): State<AppState>,
    RequireManagement(_admin): RequireManagement,
    Json(request): Json<AddKeyRequest>,
) -> Result<Json<Envelope<ProvisionedKeyResponse>>, ApiError> {
    let record = state
        .registry
        .provision(request.key.map(Secret::from), request.name)
        .await?;

    Ok(ok(ProvisionedKeyResponse {
        key: record.secret.to_string(),
        name: record.label,
    }))
}

/// POST /keymem/delkey
pub async fn delete_key(
    State(state): State<AppState>,
    RequireManagement(_admin): RequireManagement,
    Json(request): Json<KeyRequest>,
) -> Result<Json<Envelope<KeyResponse>>, ApiError> {
    let secret = Secret::new(request.key);
    state.registry.revoke(&secret).await?;

    Ok(ok(KeyResponse {
        key: secret.to_string(),
    }))
}

/// POST /keymem/getkey
pub async fn get_key(
    State(state): State<AppState>,
    RequireManagement(_admin): RequireManagement,
    Json(request): Json<KeyRequest>,
) -> Result<Json<Envelope<KeyInfoResponse>>, ApiError> {
    let info = key_info(&state, &Secret::new(request.key)).await?;
    Ok(ok(info))
}

/// GET /keymem/listkey
pub async fn list_keys(
    State(state): State<AppState>,
    RequireManagement(_admin): RequireManagement,
) -> Result<Json<Envelope<KeyListResponse>>, ApiError> {
    let keys = state
        .registry
        .list()
        .await?
        .into_iter()
        .map(|secret| secret.to_string())
        .collect();

    Ok(ok(KeyListResponse { keys }))
}

/// GET /keymem/getownkey
pub async fn get_own_key(
    State(state): State<AppState>,
    RequireKey(principal): RequireKey,
) -> Result<Json<Envelope<KeyInfoResponse>>, ApiError> {
    let info = key_info(&state, &principal.secret).await?;
    Ok(ok(info))
}

/// GET /keymem/keyaddr
pub async fn key_address(
    RequireKey(principal): RequireKey,
) -> Result<Json<Envelope<KeyAddressResponse>>, ApiError> {
    let identity = IdentityCodec::derive(&principal.secret)?;

    debug!(key = %principal.secret.redacted(), address = %identity.address(), "Resolved address");

    Ok(ok(KeyAddressResponse {
        address: identity.address().to_string(),
        pubkey: identity.public_key_hex(),
    }))
}

async fn key_info(state: &AppState, secret: &Secret) -> Result<KeyInfoResponse, ApiError> {
    let name = state.registry.label(secret).await?;
    let status = state.entitlements.status(secret).await?;

    Ok(KeyInfoResponse {
        name,
        sec: status.remaining_ttl.as_secs(),
        expdate: expiry_from_ttl(status.remaining_ttl).map(|at| at.to_rfc3339()),
        number: status.remaining_uses,
    })
}

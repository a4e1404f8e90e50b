//! Key management endpoints under `/keymem`

pub mod entitlements;
pub mod keys;
pub mod quotas;

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};

use super::state::AppState;

/// Create the `/keymem` router
pub fn create_keymem_router() -> Router<AppState> {
    Router::new()
        // Provisioned keys
        .route("/keymem/addkey", post(keys::add_key))
        .route("/keymem/delkey", post(keys::delete_key))
        .route("/keymem/getkey", post(keys::get_key))
        .route("/keymem/listkey", get(keys::list_keys))
        .route("/keymem/getownkey", get(keys::get_own_key))
        .route("/keymem/keyaddr", get(keys::key_address))
        // Entitlements
        .route("/keymem/enable", post(entitlements::enable_key))
        .route("/keymem/diskey", post(entitlements::disable_key))
        .route("/keymem/getkeyexpdate", get(entitlements::get_key_expiry))
        // Route quotas
        .route("/keymem/addcount", post(quotas::add_count))
        .route("/keymem/addtotalcount", post(quotas::add_total_count))
        .route("/keymem/getcount", post(quotas::get_count))
}

/// Absolute expiry for a remaining TTL, `None` once lapsed
fn expiry_from_ttl(ttl: Duration) -> Option<DateTime<Utc>> {
    if ttl.is_zero() {
        return None;
    }

    chrono::TimeDelta::from_std(ttl)
        .ok()
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
}

//! Route quota endpoints

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::api::middleware::{RequireKey, RequireManagement};
use crate::api::state::AppState;
use crate::api::types::{ok, ApiError, Envelope, Json};
use crate::domain::Secret;

/// Request to grant quota on a route
#[derive(Debug, Clone, Deserialize)]
pub struct RouteGrantRequest {
    pub key: String,
    pub reqpath: String,
    pub count: i64,
}

/// Request naming a route for the caller's own key
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRequest {
    pub reqpath: String,
}

/// Remaining (`number`) and cumulative (`total`) uses on a route
#[derive(Debug, Clone, Serialize)]
pub struct RouteQuotaResponse {
    pub number: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CumulativeResponse {
    pub total: i64,
}

/// POST /keymem/addcount
pub async fn add_count(
    State(state): State<AppState>,
    RequireManagement(_admin): RequireManagement,
    Json(request): Json<RouteGrantRequest>,
) -> Result<Json<Envelope<RouteQuotaResponse>>, ApiError> {
    let snapshot = state
        .quota
        .grant(&request.reqpath, &Secret::new(request.key), request.count)
        .await?;

    Ok(ok(RouteQuotaResponse {
        number: snapshot.remaining,
        total: snapshot.cumulative,
    }))
}

/// POST /keymem/addtotalcount
pub async fn add_total_count(
    State(state): State<AppState>,
    RequireManagement(_admin): RequireManagement,
    Json(request): Json<RouteGrantRequest>,
) -> Result<Json<Envelope<CumulativeResponse>>, ApiError> {
    let total = state
        .quota
        .grant_cumulative_only(&request.reqpath, &Secret::new(request.key), request.count)
        .await?;

    Ok(ok(CumulativeResponse { total }))
}

/// POST /keymem/getcount
pub async fn get_count(
    State(state): State<AppState>,
    RequireKey(principal): RequireKey,
    Json(request): Json<RouteRequest>,
) -> Result<Json<Envelope<RouteQuotaResponse>>, ApiError> {
    let snapshot = state
        .quota
        .snapshot(&request.reqpath, &principal.secret)
        .await?;

    Ok(ok(RouteQuotaResponse {
        number: snapshot.remaining,
        total: snapshot.cumulative,
    }))
}

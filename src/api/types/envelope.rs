//! Uniform response envelope: `{"status": "ok" | "error", ...}`

use serde::{Deserialize, Serialize};

use super::json::Json;

/// Logical outcome carried by every response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Ok,
    Error,
}

/// Successful response body with its payload flattened next to `status`
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub status: ResultStatus,
    #[serde(flatten)]
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        status: ResultStatus::Ok,
        data,
    })
}

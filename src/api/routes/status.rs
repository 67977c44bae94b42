use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::api::state::AppState;
use crate::storage::last_updated;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub source: String,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Version and dataset freshness. A failed freshness scan reports `null`.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let updated = match &state.storage {
        Some(storage) => {
            let storage = storage.clone();
            match tokio::task::spawn_blocking(move || last_updated(&storage)).await {
                Ok(Ok(updated)) => updated,
                Ok(Err(e)) => {
                    warn!("Could not determine dataset update time: {}", e);
                    None
                }
                Err(e) => {
                    warn!("Update time scan failed: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        source: state.accessor.describe(),
        last_updated: updated,
    })
}

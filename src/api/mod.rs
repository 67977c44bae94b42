//! REST API endpoints.
//!
//! Axum-based HTTP API serving filtered, sorted stat views as display cards,
//! the ranked map list per mode, and the raw static dataset.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::models::SelectionError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SelectionError> for ApiError {
    fn from(e: SelectionError) -> Self {
        match e {
            SelectionError::UnknownMode(_) => ApiError::NotFound(e.to_string()),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::new().allow_origin(Any);
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => CorsLayer::new().allow_origin(value),
        Err(_) => {
            warn!("Ignoring invalid CORS origin {:?}", origin);
            CorsLayer::new()
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(routes::status::health))
        .route("/api/status", get(routes::status::status))
        .route("/api/modes", get(routes::modes::list_modes))
        .route("/api/modes/:mode/maps", get(routes::modes::list_maps))
        .route(
            "/api/modes/:mode/maps/:map/brawlers",
            get(routes::stats::brawler_stats),
        )
        .route(
            "/api/modes/:mode/maps/:map/teams",
            get(routes::stats::team_stats),
        );

    if let Some(storage) = &state.storage {
        router = router.nest_service("/data", ServeDir::new(&storage.data_dir));
    }

    let cors = cors_layer(&state.settings.cors_origin);
    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

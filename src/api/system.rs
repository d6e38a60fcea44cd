//! Operational endpoints that sit outside `/api`.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::{AppState, ErrorBody};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// `GET /health`
///
/// Readiness probe; fails with 503 when the database does not answer.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    match state.store().ping().await {
        Ok(()) => Json(HealthResponse { status: "ok" }).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                }),
            )
                .into_response()
        }
    }
}

/// Any route that does not exist.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found")))
}

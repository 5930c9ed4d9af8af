//! Health check.

use axum::Json;

use crate::models::HealthResponse;

/// `GET /`: liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: zima_core::version().to_string(),
    })
}

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::AppState;
use crate::handlers::web;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusMessage {
    pub message: String,
}

/// Root route: JSON status for API clients, the UI for browsers
/// GET /
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service status or embedded UI", body = StatusMessage)
    ),
    tag = "System"
)]
pub async fn root(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let wants_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"));

    if !wants_json
        && state.static_config.enabled
        && let Some(index) = web::index_response()
    {
        return index;
    }

    tracing::debug!("API root called");
    Json(StatusMessage { message: "CodeIntel API is running".to_string() }).into_response()
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn ready_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.analysis_service.repository().ping().await {
        Ok(()) => (StatusCode::OK, "READY"),
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        },
    }
}

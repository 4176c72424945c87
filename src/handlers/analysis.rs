//! Snippet analysis API handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use crate::AppState;
use crate::models::{AnalyzeSnippetRequest, AnalyzeSnippetResponse, SnippetListResponse};
use crate::utils::{ApiError, ApiResult, ErrorResponse};

/// Analyze a snippet and store the result
/// POST /api/analyze/snippets
#[utoipa::path(
    post,
    path = "/api/analyze/snippets",
    request_body = AnalyzeSnippetRequest,
    responses(
        (status = 200, description = "Analysis saved", body = AnalyzeSnippetResponse),
        (status = 400, description = "Missing field, oversized code or oversized body", body = ErrorResponse),
        (status = 500, description = "Provider or storage failure", body = ErrorResponse)
    ),
    tag = "Snippets"
)]
pub async fn analyze_snippet(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeSnippetRequest>, JsonRejection>,
) -> ApiResult<Json<AnalyzeSnippetResponse>> {
    // A body that cannot be read as the request shape counts as missing fields
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            let limit = state.analysis_service.limits().max_body_bytes();
            tracing::warn!("Analysis request body exceeds {} bytes", limit);
            return Err(ApiError::validation_error(format!(
                "Request body exceeds the maximum size of {} bytes",
                limit
            )));
        },
        Err(rejection) => {
            tracing::warn!("Malformed analysis request body: {}", rejection.body_text());
            return Err(ApiError::missing_fields());
        },
    };

    let record = state.analysis_service.analyze_snippet(req).await?;

    Ok(Json(AnalyzeSnippetResponse {
        message: "Analysis saved successfully".to_string(),
        data: record,
    }))
}

/// List stored analyses
/// GET /api/analyze/snippets
#[utoipa::path(
    get,
    path = "/api/analyze/snippets",
    responses(
        (status = 200, description = "Stored snippets in insertion order", body = SnippetListResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "Snippets"
)]
pub async fn list_snippets(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SnippetListResponse>> {
    let records = state
        .analysis_service
        .list_snippets()
        .await
        .map_err(|e| e.with_message("Failed to fetch snippets"))?;

    Ok(Json(SnippetListResponse {
        message: "Snippets fetched successfully".to_string(),
        data: records,
    }))
}

//! API error type shared by services and handlers
//!
//! Every failure inside a request is converted here into the JSON body the
//! client sees: `{message}` for client errors, `{message, error}` for server
//! errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::llm::LLMError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Message returned for any rejected analysis request
pub const MISSING_FIELDS_MESSAGE: &str = "Please provide all the fields";

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Client-caused: missing or oversized input
    #[error("{0}")]
    Validation(String),

    /// Provider call failed or returned unusable data (includes a missing API key)
    #[error(transparent)]
    Analysis(#[from] LLMError),

    /// Persistence layer failed
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),

    /// Replaces the public `message` while keeping the status and `error` detail
    #[error("{source}")]
    WithMessage {
        message: String,
        #[source]
        source: Box<ApiError>,
    },
}

/// JSON error body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiError {
    pub fn validation_error(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing_fields() -> Self {
        Self::Validation(MISSING_FIELDS_MESSAGE.to_string())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Set the client-facing message, e.g. "Failed to fetch snippets"
    pub fn with_message(self, message: impl Into<String>) -> Self {
        match self {
            Self::WithMessage { source, .. } => {
                Self::WithMessage { message: message.into(), source }
            },
            other => Self::WithMessage { message: message.into(), source: Box::new(other) },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Analysis(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
            Self::WithMessage { source, .. } => source.status_code(),
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            Self::Validation(msg) => ErrorResponse { message: msg.clone(), error: None },
            Self::WithMessage { message, source } => {
                ErrorResponse { message: message.clone(), error: source.detail() }
            },
            other => ErrorResponse {
                message: INTERNAL_ERROR_MESSAGE.to_string(),
                error: other.detail(),
            },
        }
    }

    /// The `error` field of the body; provider failures pass their message through as given
    fn detail(&self) -> Option<String> {
        match self {
            Self::Validation(_) => None,
            Self::Analysis(e) => Some(e.detail()),
            Self::WithMessage { source, .. } => source.detail(),
            other => Some(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(self.to_error_response())).into_response()
    }
}

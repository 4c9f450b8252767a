//! Error types for sonomap-panel

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sonomap_common::events::AnalysisKind;
use thiserror::Error;

/// Rejected panel operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PanelError {
    /// Requested analysis kind is not available for the current model
    #[error("Analysis kind '{kind}' is not available for model '{model}'")]
    IllegalKind { kind: AnalysisKind, model: String },

    /// Direct dispatch for a kind other than the active one
    #[error("Analysis kind '{kind}' is not active (active kind is '{active}')")]
    InactiveKind {
        kind: AnalysisKind,
        active: AnalysisKind,
    },
}

impl PanelError {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            PanelError::IllegalKind { .. } => "ILLEGAL_KIND",
            PanelError::InactiveKind { .. } => "INACTIVE_KIND",
        }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Rejected panel operation (400)
    #[error(transparent)]
    Panel(#[from] PanelError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Panel(err) => (StatusCode::BAD_REQUEST, err.code(), err.to_string()),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

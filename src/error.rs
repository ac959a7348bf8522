use axum::{http::StatusCode, response::Json};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = match self {
            ApiError::InvalidInput(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unavailable(msg) => Json(json!({ "error": msg })),
            // Internal failures keep the underlying message for
            // diagnostics, never a stack trace.
            ApiError::Internal(msg) => Json(json!({
                "error": "Internal server error",
                "details": msg,
            })),
        };

        (status, body).into_response()
    }
}

impl From<diesel::r2d2::PoolError> for ApiError {
    fn from(e: diesel::r2d2::PoolError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Error message
    pub error: String,
    /// Underlying failure message, present on internal errors only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

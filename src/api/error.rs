use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::{SearchError, ValidationError};

#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    /// Upstream failure. `detail` is only set outside production.
    Upstream {
        error: &'static str,
        detail: Option<String>,
    },
    Unauthorized,
    RateLimited,
    NotFound(String),
}

impl ApiError {
    /// Map an orchestrator failure. Provider errors are already logged where
    /// they happen.
    pub fn from_search(error: &'static str, err: SearchError, expose_detail: bool) -> Self {
        match err {
            SearchError::Invalid(e) => ApiError::Validation(e),
            SearchError::Provider(e) => ApiError::Upstream {
                error,
                detail: expose_detail.then(|| e.to_string()),
            },
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Validation Error",
                    "message": e.reason,
                    "field": e.field,
                })),
            )
                .into_response(),
            ApiError::Upstream { error, detail } => {
                let body = match detail {
                    Some(message) => json!({ "error": error, "message": message }),
                    None => json!({ "error": error }),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid API key" })),
            )
                .into_response(),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": "Too many requests from this IP, please try again later."
                })),
            )
                .into_response(),
            ApiError::NotFound(path) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Route not found", "path": path })),
            )
                .into_response(),
        }
    }
}

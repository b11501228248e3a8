//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use pathlab_core::SimError;

/// An API failure: a status code plus the message serialized as
/// `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl From<SimError> for ApiError {
    fn from(err: SimError) -> Self {
        if err.is_validation() {
            ApiError {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            }
        } else {
            tracing::error!(error = %err, "simulation failed");
            ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "simulation failed unexpectedly".to_string(),
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

//! API error type and its JSON rendering.

use axum::{http::StatusCode, response::IntoResponse, Json};
use tracing::{error, warn};

/// Errors surfaced by request handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    /// Profile signals could not be read; no partial result is returned.
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl From<paperwise_core::Error> for ApiError {
    fn from(err: paperwise_core::Error) -> Self {
        match &err {
            paperwise_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            e if e.is_signal_failure() => ApiError::Unavailable(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unavailable(msg) => {
                warn!(error = %msg, "Profile signals unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

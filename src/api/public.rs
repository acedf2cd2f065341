//! Public API types

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

use crate::ai::chat::ChatError;

// Errors

pub struct ApiError(anyhow::Error);

/// Convert `ApiError` into an Axum compatible response. Chat errors
/// keep the session usable so they map to client/upstream statuses
/// rather than a 500.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<ChatError>() {
            Some(ChatError::Validation(_)) => StatusCode::BAD_REQUEST,
            Some(ChatError::Gateway(_)) => StatusCode::BAD_GATEWAY,
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Always log the error
        if status == StatusCode::BAD_REQUEST {
            tracing::debug!("{}", self.0);
        } else {
            tracing::error!("{}", self.0);
        }

        (status, axum::Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}

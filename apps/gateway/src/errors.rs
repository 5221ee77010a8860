use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The wire shape is always `{"success": false, "message": ...}` — the same
/// failure envelope the upstream platform API uses, so clients see one format
/// regardless of which layer rejected them.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No refresh token")]
    MissingRefreshToken,

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Cookie encoding error: {0}")]
    Cookie(#[from] axum::http::header::InvalidHeaderValue),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::MissingRefreshToken => (
                StatusCode::UNAUTHORIZED,
                "No refresh token found. Please sign in again.".to_string(),
            ),
            AppError::Upstream(e) => {
                tracing::error!("Upstream auth error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "The authentication service is unavailable".to_string(),
                )
            }
            AppError::Cookie(e) => {
                tracing::error!("Cookie encoding error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message
        }));

        (status, body).into_response()
    }
}

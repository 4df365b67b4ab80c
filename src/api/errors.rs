//! Maps [`Error`] onto HTTP responses with a consistent JSON body.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Builds a `{"error": code, "message": text}` response.
pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            Self::Validation { .. }
            | Self::InvalidQuantity { .. }
            | Self::InvalidPrice { .. } => {
                json_error(StatusCode::BAD_REQUEST, "validation_error", message)
            }
            Self::InsufficientStock { .. } => {
                json_error(StatusCode::BAD_REQUEST, "insufficient_stock", message)
            }
            Self::Conflict { .. } => json_error(StatusCode::CONFLICT, "conflict", message),
            Self::Unauthorized => json_error(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "missing or invalid credentials",
            ),
            ref err if err.is_not_found() => json_error(StatusCode::NOT_FOUND, "not_found", message),
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::Auth { .. } => {
                error!("Request failed: {}", message);
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error",
                )
            }
            _ => json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message),
        }
    }
}

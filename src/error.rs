// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Unknown username or wrong password. A single variant for both cases so
    /// the response cannot be used to enumerate accounts.
    InvalidCredentials,

    /// The one-attempt lock is already set for this student. Terminal.
    AlreadyAttempted,

    /// Question catalog resolution exhausted for a (class, stream, set) combo.
    NoContent(String),

    /// Durable store failure. Gate checks fail closed through this variant.
    Storage(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized (no active session)
    Unauthenticated,

    // 409 Conflict (e.g., duplicate signup fields)
    Conflict(String),

    // 500 Internal Server Error
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ),
            AppError::AlreadyAttempted => (
                StatusCode::FORBIDDEN,
                "You have already attempted the test. Only one attempt is allowed.".to_string(),
            ),
            AppError::NoContent(label) => (
                StatusCode::NOT_FOUND,
                format!("No questions available for {}", label),
            ),
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Login required".to_string())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::Storage`.
/// Allows using `?` operator on database queries; gate decisions therefore
/// deny access whenever the store is unreachable.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

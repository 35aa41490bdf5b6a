use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use genrelay_core::error::RelayError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`RelayError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `genrelay_core`.
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request conflicts with current resource state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- RelayError variants ---
            AppError::Relay(relay) => match relay {
                RelayError::InvalidRequest(msg) => {
                    (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
                }
                RelayError::RateLimited(msg) => {
                    (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", msg.clone())
                }
                RelayError::ProviderFault(msg) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROVIDER_FAULT",
                    format!("Generation failed: {msg}"),
                ),
                RelayError::Timeout { attempts } => (
                    StatusCode::GATEWAY_TIMEOUT,
                    "TIMEOUT",
                    format!(
                        "Generation timed out after {attempts} status checks; \
                         you may resubmit the request"
                    ),
                ),
                RelayError::Upstream(msg) => {
                    tracing::error!(error = %msg, "Upstream provider error");
                    (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        "The upstream provider could not be reached".to_string(),
                    )
                }
                RelayError::ServiceUnavailable(msg) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    msg.clone(),
                ),
                RelayError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal relay error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - SQLite unique/constraint violations (codes 1555 and 2067) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            if matches!(db_err.code().as_deref(), Some("1555") | Some("2067")) {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    "Duplicate value violates a unique constraint".to_string(),
                );
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use segcull_core::error::CoreError;
use segcull_resolver::ResolverError;
use segcull_store::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain errors of the core, store, and resolver crates and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `segcull-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A filesystem error from `segcull-store`.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A failure talking to the external segmentation service.
    #[error(transparent)]
    Resolver(#[from] ResolverError),

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
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Store errors ---
            AppError::Store(err) => classify_store_error(err),

            // --- Resolver errors ---
            AppError::Resolver(err) => {
                tracing::error!(error = %err, "Resolver error");
                (
                    StatusCode::BAD_GATEWAY,
                    "RESOLVER_ERROR",
                    "The segmentation service request failed".to_string(),
                )
            }

            // --- HTTP-specific errors ---
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

/// Classify a store error into an HTTP status, error code, and message.
///
/// - Missing sequences/frames map to 404.
/// - Malformed sequence names map to 400.
/// - I/O and payload-parse failures map to 500 with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::SequenceNotFound(_) | StoreError::FrameNotFound { .. } => {
            (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
        }
        StoreError::InvalidName(name) => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Invalid sequence name: {name}"),
        ),
        other => {
            tracing::error!(error = %other, "Store error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

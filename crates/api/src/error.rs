use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use tilebot_browser::BrowserError;
use tilebot_core::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`BrowserError`] for
/// DevTools failures. Implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `tilebot_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A browser/DevTools failure during login.
    #[error(transparent)]
    Browser(#[from] BrowserError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::SessionNotFound(id) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("No session found for id {id}"),
                ),
                CoreError::BrowserNotReady => (
                    StatusCode::BAD_REQUEST,
                    "BROWSER_NOT_READY",
                    core.to_string(),
                ),
            },

            // --- Browser errors ---
            AppError::Browser(err) => {
                tracing::error!(error = %err, "Browser error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "BROWSER_ERROR",
                    err.to_string(),
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

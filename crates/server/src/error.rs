//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! Error responses are JSON: `{ "message": ..., "errors": [...] }`, where
//! `errors` is the per-field list for validation failures. Internal error
//! detail is only included when the process runs in a non-production
//! environment (see [`init`]).

use std::sync::OnceLock;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::config::Environment;
use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Whether error responses may carry internal detail. Defaults to hidden
/// until [`init`] is called.
static EXPOSE_DETAIL: OnceLock<bool> = OnceLock::new();

/// Record the deployment environment for error rendering.
///
/// Called once at startup; later calls are ignored.
pub fn init(environment: Environment) {
    let _ = EXPOSE_DETAIL.set(!environment.is_production());
}

fn expose_detail() -> bool {
    *EXPOSE_DETAIL.get().unwrap_or(&false)
}

/// One rejected input field in a validation failure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the rejected field.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
    /// The rejected value, when it is printable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl FieldError {
    /// Build a field error with the rejected value attached.
    #[must_use]
    pub fn new(field: &str, message: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            field: field.to_owned(),
            message: message.into(),
            value: value.map(str::to_owned),
        }
    }

    /// Build a "field is required" error.
    #[must_use]
    pub fn missing(field: &str) -> Self {
        Self::new(field, "is required", None)
    }
}

/// Application-level error type for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Input failed validation; carries the per-field rejections.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request lacks a valid token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Valid token, insufficient role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a single-field validation failure.
    #[must_use]
    pub fn invalid_field(field: &str, message: impl Into<String>, value: Option<&str>) -> Self {
        Self::Validation(vec![FieldError::new(field, message, value)])
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
    /// Internal detail, present only outside production.
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Repository(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Repository(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) | RepositoryError::MissingReference(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::Token(_) => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists
                | AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients in production
        let (message, detail) = match &self {
            Self::Repository(err) => match err {
                RepositoryError::NotFound => ("Not found".to_owned(), None),
                RepositoryError::Conflict(msg) | RepositoryError::MissingReference(msg) => {
                    (msg.clone(), None)
                }
                other => (
                    "Internal server error".to_owned(),
                    expose_detail().then(|| other.to_string()),
                ),
            },
            Self::Internal(msg) => (
                "Internal server error".to_owned(),
                expose_detail().then(|| msg.clone()),
            ),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => ("Invalid credentials".to_owned(), None),
                AuthError::Token(msg) => (msg.clone(), None),
                AuthError::UserAlreadyExists => {
                    ("An account with this email already exists".to_owned(), None)
                }
                AuthError::WeakPassword(msg) => (msg.clone(), None),
                AuthError::InvalidEmail(e) => (e.to_string(), None),
                other => (
                    "Authentication error".to_owned(),
                    expose_detail().then(|| other.to_string()),
                ),
            },
            Self::Validation(_) => ("Validation failed".to_owned(), None),
            _ => (self.to_string(), None),
        };

        let errors = match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        };

        (
            status,
            Json(ErrorBody {
                message,
                errors,
                detail,
            }),
        )
            .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("arrachera".to_string());
        assert_eq!(err.to_string(), "Not found: arrachera");

        let err = AppError::Forbidden("editors cannot manage users".to_string());
        assert_eq!(err.to_string(), "Forbidden: editors cannot manage users");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Validation(vec![FieldError::missing("name")])),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_not_found_maps_to_404() {
        assert_eq!(
            get_status(AppError::Repository(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_field_error_serialization_skips_empty_value() {
        let json = serde_json::to_value(FieldError::missing("price")).expect("serializable");
        assert_eq!(json.get("field").and_then(|v| v.as_str()), Some("price"));
        assert!(json.get("value").is_none());
    }
}

//! Error types module
//!
//! This module provides the core error types used throughout the Medley
//! application. All errors are unified under the `AppError` enum which can
//! represent database, storage, validation, and dispatch errors.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the
//! `sqlx` feature.
//!
//! A stale lifecycle update is deliberately not represented here: absorbing
//! an out-of-order callback is a success outcome, reported through
//! `Transitioned::applied`, not an error.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like conflicting writes
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DATABASE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Dispatch failed: {0}")]
    DispatchFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error: {message}")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        match err {
            SqlxError::RowNotFound => AppError::NotFound("record not found".to_string()),
            other => AppError::Database(other),
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("Serialization error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("Invalid UUID: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: "Unhandled internal error".to_string(),
            source: err,
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// Reduces duplication in ErrorMetadata impl; client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::PreconditionFailed(_) => (
            400,
            "PRECONDITION_FAILED",
            false,
            Some("Complete the upload before confirming it"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Provide valid credentials"),
            false,
            LogLevel::Warn,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            None,
            false,
            LogLevel::Debug,
        ),
        AppError::Conflict(_) => (
            409,
            "CONFLICT",
            false,
            Some("Reload the asset state and retry"),
            false,
            LogLevel::Warn,
        ),
        AppError::DispatchFailed(_) => (
            500,
            "DISPATCH_FAILED",
            true,
            Some("Retry the confirmation after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            false,
            Some("Contact support if this error persists"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            false,
            Some("Contact support if this error persists"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Variant name for logging and non-production error bodies
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PreconditionFailed(_) => "PreconditionFailed",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::DispatchFailed(_) => "DispatchFailed",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Full message including the source error chain, for logs and
    /// non-production responses
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::PreconditionFailed(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Conflict(ref msg) => msg.clone(),
            AppError::DispatchFailed(_) => crate::constants::DISPATCH_FAILED_MESSAGE.to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_the_taxonomy() {
        assert_eq!(
            AppError::InvalidInput("bad".to_string()).http_status_code(),
            400
        );
        assert_eq!(
            AppError::PreconditionFailed("no object".to_string()).http_status_code(),
            400
        );
        assert_eq!(
            AppError::Unauthorized("bad secret".to_string()).http_status_code(),
            401
        );
        assert_eq!(
            AppError::NotFound("missing".to_string()).http_status_code(),
            404
        );
        assert_eq!(
            AppError::Conflict("status moved".to_string()).http_status_code(),
            409
        );
        assert_eq!(
            AppError::DispatchFailed("pipeline down".to_string()).http_status_code(),
            500
        );
        assert_eq!(
            AppError::Internal("boom".to_string()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            AppError::Unauthorized("x".to_string()).error_code(),
            "UNAUTHORIZED"
        );
        assert_eq!(
            AppError::DispatchFailed("x".to_string()).error_code(),
            "DISPATCH_FAILED"
        );
        assert_eq!(
            AppError::PreconditionFailed("x".to_string()).error_code(),
            "PRECONDITION_FAILED"
        );
    }

    #[test]
    fn test_dispatch_failure_hides_cause_from_clients() {
        let err = AppError::DispatchFailed("connect timeout to pipeline".to_string());
        assert_eq!(err.client_message(), "failed to queue processing");
        assert!(err.is_sensitive());
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(
            AppError::InvalidInput("x".to_string()).log_level(),
            LogLevel::Debug
        );
        assert_eq!(
            AppError::Unauthorized("x".to_string()).log_level(),
            LogLevel::Warn
        );
        assert_eq!(
            AppError::Internal("x".to_string()).log_level(),
            LogLevel::Error
        );
    }

    #[test]
    fn test_validation_errors_convert_to_invalid_input() {
        let errors = validator::ValidationErrors::new();
        let err: AppError = errors.into();
        assert_eq!(err.http_status_code(), 400);
    }

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: AppError = SqlxError::RowNotFound.into();
        assert_eq!(err.http_status_code(), 404);
    }
}

//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Domain errors
//! (`AppError` and the per-crate error enums that convert into it) become
//! `HttpAppError` via `?` and render consistently: status from the error
//! taxonomy, structured JSON body, level-appropriate logging.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use medley_core::validation::UploadValidationError;
use medley_core::{AppError, ErrorMetadata, LogLevel};
use medley_db::StoreError;
use medley_pipeline::PipelineError;
use medley_storage::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse.
/// Needed because of Rust's orphan rules: IntoResponse is an external trait
/// and AppError lives in medley-core.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// JSON body deserialization failures become a 400 in the ErrorResponse
/// format instead of axum's plain-text default.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<StoreError> for HttpAppError {
    fn from(err: StoreError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<PipelineError> for HttpAppError {
    fn from(err: PipelineError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<UploadValidationError> for HttpAppError {
    fn from(err: UploadValidationError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

/// JSON body extractor that deserializes and then runs `validator` rules,
/// so malformed bodies and rule violations both produce the structured 400
/// envelope. Use instead of `Json<T>` for request DTOs.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        inner.validate().map_err(AppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Request failed");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let is_production = is_production_env();

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Details are always hidden in production; elsewhere only sensitive
        // errors (infrastructure failures) are stripped.
        let body = if is_production || app_error.is_sensitive() {
            Json(ErrorResponse {
                error: app_error.client_message(),
                details: None,
                error_type: None,
                code: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                suggested_action: app_error.suggested_action().map(String::from),
            })
        } else {
            Json(ErrorResponse {
                error: app_error.client_message(),
                details: Some(app_error.detailed_message()),
                error_type: Some(app_error.error_type().to_string()),
                code: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                suggested_action: app_error.suggested_action().map(String::from),
            })
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medley_core::validation::UploadValidationError;
    use medley_db::StoreError;
    use medley_pipeline::PipelineError;
    use medley_storage::StorageError;

    #[test]
    fn test_from_store_error_not_found() {
        let HttpAppError(app_err) = StoreError::NotFound.into();
        match app_err {
            AppError::NotFound(_) => {}
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_from_store_error_duplicate_is_conflict() {
        let HttpAppError(app_err) = StoreError::Duplicate.into();
        match app_err {
            AppError::Conflict(_) => {}
            other => panic!("Expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_from_storage_error_presign() {
        let HttpAppError(app_err) =
            StorageError::PresignFailed("endpoint unreachable".to_string()).into();
        match app_err {
            AppError::Storage(msg) => assert!(msg.contains("endpoint unreachable")),
            other => panic!("Expected Storage, got {:?}", other),
        }
    }

    #[test]
    fn test_from_storage_error_invalid_key() {
        let HttpAppError(app_err) = StorageError::InvalidKey("../escape".to_string()).into();
        match app_err {
            AppError::InvalidInput(msg) => assert_eq!(msg, "../escape"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_from_pipeline_error_is_dispatch_failure() {
        let HttpAppError(app_err) = PipelineError::Rejected("503 queue full".to_string()).into();
        match app_err {
            AppError::DispatchFailed(msg) => assert!(msg.contains("503 queue full")),
            other => panic!("Expected DispatchFailed, got {:?}", other),
        }
        let HttpAppError(app_err) = PipelineError::Transport("connect refused".to_string()).into();
        assert_eq!(app_err.http_status_code(), 500);
        assert_eq!(app_err.error_code(), "DISPATCH_FAILED");
    }

    #[test]
    fn test_from_upload_validation_error() {
        let HttpAppError(app_err) = UploadValidationError::EmptyFile.into();
        match app_err {
            AppError::InvalidInput(_) => {}
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    /// The public error contract: "error", "code" and "recoverable" are
    /// always present; "details", "error_type" and "suggested_action" are
    /// optional.
    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            error: "Not found".to_string(),
            details: None,
            error_type: None,
            code: "NOT_FOUND".to_string(),
            recoverable: false,
            suggested_action: None,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert!(json.get("error").and_then(|v| v.as_str()).is_some());
        assert_eq!(json.get("code").and_then(|v| v.as_str()), Some("NOT_FOUND"));
        assert!(json.get("recoverable").and_then(|v| v.as_bool()).is_some());
        assert!(json.get("details").is_none());
        assert!(json.get("error_type").is_none());
    }
}

//! Pipeline callback endpoints.
//!
//! Deliveries authenticate with the shared `X-Callback-Secret` header.
//! The secret check runs before the body is even looked at, so a bad
//! secret is always a bare 401 that reveals nothing about asset existence.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use subtle::ConstantTimeEq;

use medley_core::constants::CALLBACK_SECRET_HEADER;
use medley_core::models::{CallbackAck, ImageCallback, VideoCallback};
use medley_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::services::IngestService;
use crate::state::SecurityConfig;

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn verify_callback_secret(
    security: &SecurityConfig,
    headers: &HeaderMap,
) -> Result<(), HttpAppError> {
    let presented = headers
        .get(CALLBACK_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !secure_compare(presented, &security.callback_secret) {
        return Err(AppError::Unauthorized("invalid callback secret".to_string()).into());
    }
    Ok(())
}

/// Receive a transcoding status callback for a video asset.
#[utoipa::path(
    post,
    path = "/api/v0/callbacks/video",
    tag = "callbacks",
    request_body = VideoCallback,
    responses(
        (status = 200, description = "Callback acknowledged", body = CallbackAck),
        (status = 400, description = "Malformed callback payload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid callback secret", body = ErrorResponse),
        (status = 404, description = "Unknown correlation id", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(security, ingest, headers, payload))]
pub async fn video_callback(
    State(security): State<SecurityConfig>,
    State(ingest): State<IngestService>,
    headers: HeaderMap,
    payload: Result<Json<VideoCallback>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    verify_callback_secret(&security, &headers)?;
    let Json(callback) = payload?;
    let ack = ingest.apply_video_callback(callback).await?;
    Ok(Json(ack))
}

/// Receive a processing status callback for an image asset.
#[utoipa::path(
    post,
    path = "/api/v0/callbacks/image",
    tag = "callbacks",
    request_body = ImageCallback,
    responses(
        (status = 200, description = "Callback acknowledged", body = CallbackAck),
        (status = 400, description = "Malformed callback payload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid callback secret", body = ErrorResponse),
        (status = 404, description = "Unknown correlation id", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(security, ingest, headers, payload))]
pub async fn image_callback(
    State(security): State<SecurityConfig>,
    State(ingest): State<IngestService>,
    headers: HeaderMap,
    payload: Result<Json<ImageCallback>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    verify_callback_secret(&security, &headers)?;
    let Json(callback) = payload?;
    let ack = ingest.apply_image_callback(callback).await?;
    Ok(Json(ack))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_compare() {
        assert!(secure_compare("secret", "secret"));
        assert!(!secure_compare("secret", "secres"));
        assert!(!secure_compare("secret", "secret2"));
        assert!(!secure_compare("", "secret"));
        assert!(secure_compare("", ""));
    }
}

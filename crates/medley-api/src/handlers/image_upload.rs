//! Image upload grant and confirmation endpoints.
//!
//! Unlike videos, an image has no record until its upload is confirmed;
//! the confirm request therefore carries the upload metadata again.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use medley_core::models::{
    ConfirmImageRequest, ConfirmResponse, UploadGrantRequest, UploadGrantResponse,
};

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Issue a presigned grant for a direct image upload.
#[utoipa::path(
    post,
    path = "/api/v0/images/uploads",
    tag = "images",
    request_body = UploadGrantRequest,
    responses(
        (status = 200, description = "Upload grant issued", body = UploadGrantResponse),
        (status = 400, description = "Invalid upload request", body = ErrorResponse),
        (status = 500, description = "Storage unavailable", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state, request))]
pub async fn grant_image_upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UploadGrantRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let grant = state.grants.grant_image_upload(request).await?;
    Ok(Json(grant))
}

/// Confirm that a granted image upload finished. Fails with 400 when no
/// object exists at the granted path, and creates no record in that case.
#[utoipa::path(
    post,
    path = "/api/v0/images/uploads/confirm",
    tag = "images",
    request_body = ConfirmImageRequest,
    responses(
        (status = 200, description = "Upload confirmed, job queued", body = ConfirmResponse),
        (status = 400, description = "Invalid request or missing uploaded object", body = ErrorResponse),
        (status = 409, description = "Correlation id already confirmed with a different upload", body = ErrorResponse),
        (status = 500, description = "Job could not be queued", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state, request), fields(correlation_id = %request.correlation_id))]
pub async fn confirm_image_upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ConfirmImageRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = state.dispatch.confirm_image(request).await?;
    Ok(Json(response))
}

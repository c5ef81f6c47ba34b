//! Video upload grant and confirmation endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use medley_core::models::{
    ConfirmResponse, ConfirmVideoRequest, UploadGrantRequest, UploadGrantResponse,
};

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Issue a presigned grant for a direct video upload.
///
/// The response carries the correlation id the client must use for the
/// confirmation call and all later status polls.
#[utoipa::path(
    post,
    path = "/api/v0/videos/uploads",
    tag = "videos",
    request_body = UploadGrantRequest,
    responses(
        (status = 200, description = "Upload grant issued", body = UploadGrantResponse),
        (status = 400, description = "Invalid upload request", body = ErrorResponse),
        (status = 500, description = "Storage unavailable", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state, request))]
pub async fn grant_video_upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UploadGrantRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let grant = state.grants.grant_video_upload(request).await?;
    Ok(Json(grant))
}

/// Confirm that a granted video upload finished, queueing it for
/// transcoding.
#[utoipa::path(
    post,
    path = "/api/v0/videos/uploads/confirm",
    tag = "videos",
    request_body = ConfirmVideoRequest,
    responses(
        (status = 200, description = "Upload confirmed, job queued", body = ConfirmResponse),
        (status = 400, description = "Invalid confirmation request", body = ErrorResponse),
        (status = 500, description = "Job could not be queued", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state, request), fields(correlation_id = %request.correlation_id))]
pub async fn confirm_video_upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ConfirmVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = state.dispatch.confirm_video(request).await?;
    Ok(Json(response))
}

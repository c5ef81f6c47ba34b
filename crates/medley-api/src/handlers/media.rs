use crate::error::{ErrorResponse, HttpAppError};
use crate::services::StatusQueryService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use medley_core::models::{AssetStatusResponse, MediaItemResponse};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema, utoipa::IntoParams)]
pub struct PostMediaQuery {
    pub post_id: Uuid,
}

#[utoipa::path(
    get,
    path = "/api/v0/videos/{correlation_id}/status",
    tag = "videos",
    params(
        ("correlation_id" = Uuid, Path, description = "Correlation id returned by the upload grant")
    ),
    responses(
        (status = 200, description = "Current processing state of the video", body = AssetStatusResponse),
        (status = 404, description = "No video asset for this correlation id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(status), fields(correlation_id = %correlation_id))]
pub async fn get_video_status(
    Path(correlation_id): Path<Uuid>,
    State(status): State<StatusQueryService>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = status.video_status(correlation_id).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v0/images/{correlation_id}/status",
    tag = "images",
    params(
        ("correlation_id" = Uuid, Path, description = "Correlation id returned by the upload grant")
    ),
    responses(
        (status = 200, description = "Current processing state of the image", body = AssetStatusResponse),
        (status = 404, description = "No image asset for this correlation id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(status), fields(correlation_id = %correlation_id))]
pub async fn get_image_status(
    Path(correlation_id): Path<Uuid>,
    State(status): State<StatusQueryService>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = status.image_status(correlation_id).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v0/media",
    tag = "media",
    params(
        PostMediaQuery
    ),
    responses(
        (status = 200, description = "Displayable media attached to the post, in sort order", body = Vec<MediaItemResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(post_id = %query.post_id))]
pub async fn list_post_media(
    Query(query): Query<PostMediaQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let items = state.status.post_media(query.post_id).await?;
    Ok(Json(items))
}

#[utoipa::path(
    delete,
    path = "/api/v0/media/{media_id}",
    tag = "media",
    params(
        ("media_id" = Uuid, Path, description = "Media asset ID")
    ),
    responses(
        (status = 204, description = "Media deleted"),
        (status = 404, description = "Media not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(media_id = %media_id))]
pub async fn delete_media(
    Path(media_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.lifecycle.delete_media(media_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::asset::{AssetKind, AssetStatus, MediaAsset, OutputSet};

/// Request for a direct-upload grant (video or image)
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UploadGrantRequest {
    /// Original filename
    #[validate(length(
        min = 1,
        max = 255,
        message = "Filename must be between 1 and 255 characters"
    ))]
    pub filename: String,
    /// Content type (MIME type)
    #[validate(length(
        min = 1,
        max = 255,
        message = "Content type must be between 1 and 255 characters"
    ))]
    pub content_type: String,
    /// Declared file size in bytes
    #[validate(range(min = 1, message = "File size must be at least 1 byte"))]
    pub file_size: i64,
    /// Post this asset will belong to, when already known
    #[serde(default)]
    pub post_id: Option<Uuid>,
    /// Ordering within the owning post
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Response containing the presigned upload URL and the correlation id the
/// client uses for every later call about this asset.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadGrantResponse {
    pub upload_url: String,
    pub correlation_id: Uuid,
    /// Blob key the upload lands on; echoed back on image confirmation
    pub raw_path: String,
    pub expires_in_secs: u64,
}

/// Confirm that a granted video upload finished
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ConfirmVideoRequest {
    pub correlation_id: Uuid,
    #[serde(default)]
    pub post_id: Option<Uuid>,
}

/// Confirm that a granted image upload finished. The record for an image is
/// only created here, so the request carries the upload metadata again.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ConfirmImageRequest {
    pub correlation_id: Uuid,
    /// Blob key returned by the grant
    #[validate(length(
        min = 1,
        max = 1024,
        message = "Raw path must be between 1 and 1024 characters"
    ))]
    pub raw_path: String,
    #[serde(default)]
    pub post_id: Option<Uuid>,
    #[serde(default)]
    #[validate(length(max = 255, message = "Filename must be at most 255 characters"))]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, message = "File size must be at least 1 byte"))]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Result of a successful confirmation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConfirmResponse {
    pub media_id: Uuid,
    pub correlation_id: Uuid,
    pub status: AssetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_correlation_id: Option<Uuid>,
}

impl ConfirmResponse {
    pub fn from_asset(asset: &MediaAsset) -> Self {
        ConfirmResponse {
            media_id: asset.id,
            correlation_id: asset.public_id,
            status: asset.status,
            job_correlation_id: asset.job_id,
        }
    }
}

/// Status envelope for a single asset. `outputs` is present only once the
/// asset is ready; `original_url` is present for images, which render from
/// the raw upload while variants are pending.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssetStatusResponse {
    pub correlation_id: Uuid,
    pub media_id: Uuid,
    pub kind: AssetKind,
    pub status: AssetStatus,
    pub progress: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<OutputSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AssetStatusResponse {
    pub fn from_asset(asset: &MediaAsset, original_url: Option<String>) -> Self {
        let outputs = if asset.status == AssetStatus::Ready {
            asset.outputs.clone()
        } else {
            None
        };
        AssetStatusResponse {
            correlation_id: asset.public_id,
            media_id: asset.id,
            kind: asset.kind,
            status: asset.status,
            progress: asset.progress,
            outputs,
            original_url,
            error: asset.error_message.clone(),
        }
    }
}

/// One displayable entry of a post's media listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaItemResponse {
    pub media_id: Uuid,
    pub correlation_id: Uuid,
    pub kind: AssetKind,
    pub status: AssetStatus,
    pub sort_order: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<OutputSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl MediaItemResponse {
    pub fn from_asset(asset: &MediaAsset, original_url: Option<String>) -> Self {
        let outputs = if asset.status == AssetStatus::Ready {
            asset.outputs.clone()
        } else {
            None
        };
        MediaItemResponse {
            media_id: asset.id,
            correlation_id: asset.public_id,
            kind: asset.kind,
            status: asset.status,
            sort_order: asset.sort_order,
            outputs,
            original_url,
            uploaded_at: asset.uploaded_at,
        }
    }
}

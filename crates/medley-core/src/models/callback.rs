use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

use super::asset::ImageVariants;

/// Status field of a video pipeline callback. Unknown strings fail
/// deserialization and surface as a 400 before any lookup happens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VideoCallbackStatus {
    Progress,
    Ready,
    Error,
}

impl Display for VideoCallbackStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            VideoCallbackStatus::Progress => write!(f, "progress"),
            VideoCallbackStatus::Ready => write!(f, "ready"),
            VideoCallbackStatus::Error => write!(f, "error"),
        }
    }
}

/// Status field of an image pipeline callback. Image jobs report no
/// intermediate progress.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageCallbackStatus {
    Ready,
    Error,
}

impl Display for ImageCallbackStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ImageCallbackStatus::Ready => write!(f, "ready"),
            ImageCallbackStatus::Error => write!(f, "error"),
        }
    }
}

/// Callback body posted by the transcoding pipeline. `video_id` is the
/// asset's public correlation id; `job_id` echoes the dispatch that started
/// the job.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoCallback {
    pub job_id: Uuid,
    pub video_id: Uuid,
    pub status: VideoCallbackStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Callback body posted by the image pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageCallback {
    pub job_id: Uuid,
    pub image_id: Uuid,
    pub status: ImageCallbackStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<ImageVariants>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blurhash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Acknowledgement returned for every authenticated, well-formed callback.
/// `applied` is false when the delivery was absorbed as stale.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CallbackAck {
    pub received: bool,
    pub applied: bool,
}

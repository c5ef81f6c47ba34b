use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
#[cfg(feature = "sqlx")]
use sqlx::FromRow;
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "asset_kind", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AssetKind::Image => write!(f, "image"),
            AssetKind::Video => write!(f, "video"),
        }
    }
}

/// Lifecycle status of a media asset.
///
/// Callbacks from the processing pipeline arrive at-least-once and without
/// ordering guarantees, so every status write goes through the monotonic
/// guard in [`AssetStatus::accepts`]: a write may move an asset forward or
/// sideways, never backward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "asset_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Uploading,
    Processing,
    Transcoding,
    Ready,
    Error,
}

impl AssetStatus {
    /// Precedence rank used by the transition guard. `Ready` and `Error`
    /// share the top rank: terminal redeliveries re-apply cleanly and a
    /// late success can overwrite a timeout error.
    pub fn rank(&self) -> u8 {
        match self {
            AssetStatus::Uploading => 0,
            AssetStatus::Processing => 1,
            AssetStatus::Transcoding => 2,
            AssetStatus::Ready | AssetStatus::Error => 3,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AssetStatus::Ready | AssetStatus::Error)
    }

    /// Whether a write targeting `next` is allowed from `self`. A `false`
    /// answer marks the write as stale; stores absorb it without touching
    /// the row.
    pub fn accepts(&self, next: AssetStatus) -> bool {
        next.rank() >= self.rank()
    }
}

impl Display for AssetStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AssetStatus::Uploading => write!(f, "uploading"),
            AssetStatus::Processing => write!(f, "processing"),
            AssetStatus::Transcoding => write!(f, "transcoding"),
            AssetStatus::Ready => write!(f, "ready"),
            AssetStatus::Error => write!(f, "error"),
        }
    }
}

/// Sized renditions of a processed image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ImageVariants {
    pub thumbnail: String,
    pub medium: String,
    pub large: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct VideoOutputs {
    /// HLS master playlist URL
    pub playlist_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ImageOutputs {
    pub variants: ImageVariants,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blurhash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
}

/// Kind-specific processing outputs, stored as a tagged JSON document.
/// Populated in full by a terminal `ready` transition, never partially.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutputSet {
    Video(VideoOutputs),
    Image(ImageOutputs),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaAsset {
    pub id: Uuid,
    /// Owning post, when the asset has been attached to one
    pub post_id: Option<Uuid>,
    pub kind: AssetKind,
    /// The only identifier clients and the pipeline ever see. Unique and
    /// immutable for the life of the asset.
    pub public_id: Uuid,
    pub status: AssetStatus,
    /// Correlates pipeline callbacks with the dispatch that caused them.
    /// Present exactly while a job is in flight.
    pub job_id: Option<Uuid>,
    /// Blob key of the original upload
    pub raw_key: String,
    pub outputs: Option<OutputSet>,
    /// 0-100, never decreases within a job's lifetime
    pub progress: i16,
    pub error_message: Option<String>,
    /// Ordering within the owning post
    pub sort_order: i32,
    pub file_size: Option<i64>,
    pub content_type: Option<String>,
    pub original_filename: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaAsset {
    /// Feed visibility. A video is hidden until transcoding has produced
    /// playable outputs; an image renders from its original upload while
    /// variant generation is still in flight.
    pub fn is_displayable(&self) -> bool {
        match self.kind {
            AssetKind::Video => self.status == AssetStatus::Ready,
            AssetKind::Image => true,
        }
    }

    pub fn video_outputs(&self) -> Option<&VideoOutputs> {
        match self.outputs {
            Some(OutputSet::Video(ref outputs)) => Some(outputs),
            _ => None,
        }
    }

    pub fn image_outputs(&self) -> Option<&ImageOutputs> {
        match self.outputs {
            Some(OutputSet::Image(ref outputs)) => Some(outputs),
            _ => None,
        }
    }
}

/// Insert payload for a new asset row. Assets always start in `Uploading`
/// with no job, no outputs and zero progress.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub public_id: Uuid,
    pub post_id: Option<Uuid>,
    pub kind: AssetKind,
    pub raw_key: String,
    pub file_size: Option<i64>,
    pub content_type: Option<String>,
    pub original_filename: Option<String>,
    pub sort_order: i32,
}

impl NewAsset {
    pub fn into_asset(self, now: DateTime<Utc>) -> MediaAsset {
        MediaAsset {
            id: Uuid::new_v4(),
            post_id: self.post_id,
            kind: self.kind,
            public_id: self.public_id,
            status: AssetStatus::Uploading,
            job_id: None,
            raw_key: self.raw_key,
            outputs: None,
            progress: 0,
            error_message: None,
            sort_order: self.sort_order,
            file_size: self.file_size,
            content_type: self.content_type,
            original_filename: self.original_filename,
            uploaded_at: now,
            updated_at: now,
        }
    }
}

/// Database row for the media_assets table (outputs kept as raw JSON).
#[derive(Debug)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct AssetRow {
    pub id: Uuid,
    pub post_id: Option<Uuid>,
    pub kind: AssetKind,
    pub public_id: Uuid,
    pub status: AssetStatus,
    pub job_id: Option<Uuid>,
    pub raw_key: String,
    pub outputs: Option<JsonValue>,
    pub progress: i16,
    pub error_message: Option<String>,
    pub sort_order: i32,
    pub file_size: Option<i64>,
    pub content_type: Option<String>,
    pub original_filename: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssetRow {
    /// Decode the stored outputs document and build the domain asset.
    pub fn into_asset(self) -> Result<MediaAsset, serde_json::Error> {
        let outputs = match self.outputs {
            Some(value) => Some(serde_json::from_value::<OutputSet>(value)?),
            None => None,
        };
        Ok(MediaAsset {
            id: self.id,
            post_id: self.post_id,
            kind: self.kind,
            public_id: self.public_id,
            status: self.status,
            job_id: self.job_id,
            raw_key: self.raw_key,
            outputs,
            progress: self.progress,
            error_message: self.error_message,
            sort_order: self.sort_order,
            file_size: self.file_size,
            content_type: self.content_type,
            original_filename: self.original_filename,
            uploaded_at: self.uploaded_at,
            updated_at: self.updated_at,
        })
    }
}

/// Three-way field update used by [`AssetChange`]
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Keep,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    pub fn apply(self, slot: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Clear => *slot = None,
            Patch::Set(value) => *slot = Some(value),
        }
    }
}

/// One requested state transition.
///
/// The constructors are the only shapes the engine performs; building a
/// change by hand is reserved for tests. Stores apply a change under the
/// monotonic guard and bump `updated_at` when they do.
#[derive(Debug, Clone)]
pub struct AssetChange {
    pub status: AssetStatus,
    /// Set when present; the stored value never decreases
    pub progress: Option<i16>,
    pub job_id: Patch<Uuid>,
    pub outputs: Patch<OutputSet>,
    pub error_message: Patch<String>,
    /// Attach the asset to its owning post as part of the transition
    pub post_id: Option<Uuid>,
}

impl AssetChange {
    fn to(status: AssetStatus) -> Self {
        AssetChange {
            status,
            progress: None,
            job_id: Patch::Keep,
            outputs: Patch::Keep,
            error_message: Patch::Keep,
            post_id: None,
        }
    }

    /// Video job accepted by the pipeline
    pub fn dispatched(job_id: Uuid) -> Self {
        AssetChange {
            job_id: Patch::Set(job_id),
            ..Self::to(AssetStatus::Transcoding)
        }
    }

    /// Image job accepted by the pipeline
    pub fn processing(job_id: Uuid) -> Self {
        AssetChange {
            job_id: Patch::Set(job_id),
            ..Self::to(AssetStatus::Processing)
        }
    }

    /// Progress frame during transcoding
    pub fn progress(pct: i16) -> Self {
        AssetChange {
            progress: Some(pct.clamp(0, 100)),
            ..Self::to(AssetStatus::Transcoding)
        }
    }

    pub fn video_ready(outputs: VideoOutputs) -> Self {
        AssetChange {
            progress: Some(100),
            job_id: Patch::Clear,
            outputs: Patch::Set(OutputSet::Video(outputs)),
            error_message: Patch::Clear,
            ..Self::to(AssetStatus::Ready)
        }
    }

    pub fn image_ready(outputs: ImageOutputs) -> Self {
        AssetChange {
            job_id: Patch::Clear,
            outputs: Patch::Set(OutputSet::Image(outputs)),
            error_message: Patch::Clear,
            ..Self::to(AssetStatus::Ready)
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        AssetChange {
            job_id: Patch::Clear,
            error_message: Patch::Set(message.into()),
            ..Self::to(AssetStatus::Error)
        }
    }

    pub fn with_post(mut self, post_id: Uuid) -> Self {
        self.post_id = Some(post_id);
        self
    }

    /// Apply this change to a loaded asset. The caller has already checked
    /// [`AssetStatus::accepts`]; this only writes fields.
    pub fn apply_to(self, asset: &mut MediaAsset, now: DateTime<Utc>) {
        asset.status = self.status;
        if let Some(pct) = self.progress {
            asset.progress = asset.progress.max(pct);
        }
        self.job_id.apply(&mut asset.job_id);
        self.outputs.apply(&mut asset.outputs);
        self.error_message.apply(&mut asset.error_message);
        if let Some(post_id) = self.post_id {
            asset.post_id = Some(post_id);
        }
        asset.updated_at = now;
    }
}

//! Pipeline callback ingestion.
//!
//! Deliveries arrive at-least-once and out of order. Every well-formed,
//! authenticated callback is acknowledged with 200 whether or not it
//! changed anything; `applied: false` tells the pipeline the delivery was
//! absorbed as stale. Only unknown correlation ids and malformed payloads
//! are real errors.

use std::sync::Arc;

use uuid::Uuid;

use medley_core::constants::PROCESSING_FAILED_MESSAGE;
use medley_core::models::{
    AssetChange, AssetKind, CallbackAck, ImageCallback, ImageCallbackStatus, ImageOutputs,
    MediaAsset, VideoCallback, VideoCallbackStatus, VideoOutputs,
};
use medley_core::AppError;
use medley_db::{AssetStore, ExpectedStatus};

#[derive(Clone)]
pub struct IngestService {
    assets: Arc<dyn AssetStore>,
}

impl IngestService {
    pub fn new(assets: Arc<dyn AssetStore>) -> Self {
        IngestService { assets }
    }

    /// Apply a video pipeline callback.
    #[tracing::instrument(
        skip(self, callback),
        fields(correlation_id = %callback.video_id, job_id = %callback.job_id)
    )]
    pub async fn apply_video_callback(
        &self,
        callback: VideoCallback,
    ) -> Result<CallbackAck, AppError> {
        let change = video_change(&callback)?;
        let asset = self.lookup(callback.video_id, AssetKind::Video).await?;
        warn_on_job_mismatch(&asset, callback.job_id);
        self.apply(asset, change).await
    }

    /// Apply an image pipeline callback.
    #[tracing::instrument(
        skip(self, callback),
        fields(correlation_id = %callback.image_id, job_id = %callback.job_id)
    )]
    pub async fn apply_image_callback(
        &self,
        callback: ImageCallback,
    ) -> Result<CallbackAck, AppError> {
        let change = image_change(&callback)?;
        let asset = self.lookup(callback.image_id, AssetKind::Image).await?;
        warn_on_job_mismatch(&asset, callback.job_id);
        self.apply(asset, change).await
    }

    async fn lookup(&self, correlation_id: Uuid, kind: AssetKind) -> Result<MediaAsset, AppError> {
        match self.assets.find_by_public_id(correlation_id).await? {
            Some(asset) if asset.kind == kind => Ok(asset),
            _ => Err(AppError::NotFound(format!(
                "no {} asset for correlation id {}",
                kind, correlation_id
            ))),
        }
    }

    async fn apply(&self, asset: MediaAsset, change: AssetChange) -> Result<CallbackAck, AppError> {
        let attempted = change.status;
        let transitioned = self
            .assets
            .transition(asset.public_id, ExpectedStatus::Any, change)
            .await?;

        if transitioned.applied {
            tracing::info!(
                correlation_id = %asset.public_id,
                status = %transitioned.asset.status,
                "applied pipeline callback"
            );
        } else {
            tracing::info!(
                correlation_id = %asset.public_id,
                current_status = %transitioned.asset.status,
                attempted_status = %attempted,
                "absorbed stale pipeline callback"
            );
        }

        Ok(CallbackAck {
            received: true,
            applied: transitioned.applied,
        })
    }
}

/// Shape validation happens before the asset lookup: a `ready` without its
/// outputs or a `progress` without a percentage is a 400 that must not
/// touch the store.
fn video_change(callback: &VideoCallback) -> Result<AssetChange, AppError> {
    match callback.status {
        VideoCallbackStatus::Progress => {
            let pct = callback.progress.ok_or_else(|| {
                AppError::InvalidInput("progress callback without a percentage".to_string())
            })?;
            Ok(AssetChange::progress(pct))
        }
        VideoCallbackStatus::Ready => {
            let playlist_url = callback.playlist_url.clone().ok_or_else(|| {
                AppError::InvalidInput("ready callback without a playlist_url".to_string())
            })?;
            Ok(AssetChange::video_ready(VideoOutputs {
                playlist_url,
                thumbnail_url: callback.thumbnail_url.clone(),
                duration_secs: callback.duration_secs,
                width: callback.width,
                height: callback.height,
            }))
        }
        VideoCallbackStatus::Error => Ok(AssetChange::failed(
            callback
                .error
                .clone()
                .unwrap_or_else(|| PROCESSING_FAILED_MESSAGE.to_string()),
        )),
    }
}

fn image_change(callback: &ImageCallback) -> Result<AssetChange, AppError> {
    match callback.status {
        ImageCallbackStatus::Ready => {
            let variants = callback.variants.clone().ok_or_else(|| {
                AppError::InvalidInput("ready callback without variants".to_string())
            })?;
            Ok(AssetChange::image_ready(ImageOutputs {
                variants,
                blurhash: callback.blurhash.clone(),
                width: callback.width,
                height: callback.height,
            }))
        }
        ImageCallbackStatus::Error => Ok(AssetChange::failed(
            callback
                .error
                .clone()
                .unwrap_or_else(|| PROCESSING_FAILED_MESSAGE.to_string()),
        )),
    }
}

/// A job id that does not match the stored one usually means the callback
/// belongs to a superseded dispatch. Correlation is by public id, so the
/// delivery is still processed; the monotonic transition absorbs anything
/// genuinely stale.
fn warn_on_job_mismatch(asset: &MediaAsset, callback_job_id: Uuid) {
    if let Some(stored) = asset.job_id {
        if stored != callback_job_id {
            tracing::warn!(
                correlation_id = %asset.public_id,
                stored_job_id = %stored,
                callback_job_id = %callback_job_id,
                "callback job id does not match the stored job"
            );
        }
    }
}

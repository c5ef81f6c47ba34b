//! Asset deletion.

use std::sync::Arc;

use uuid::Uuid;

use medley_core::AppError;
use medley_db::AssetStore;
use medley_storage::{asset_prefix, BlobStore};

/// Removes an asset and everything it owns in blob storage.
#[derive(Clone)]
pub struct MediaLifecycleService {
    assets: Arc<dyn AssetStore>,
    blobs: Arc<dyn BlobStore>,
}

impl MediaLifecycleService {
    pub fn new(assets: Arc<dyn AssetStore>, blobs: Arc<dyn BlobStore>) -> Self {
        MediaLifecycleService { assets, blobs }
    }

    /// Delete an asset by row id.
    ///
    /// Blobs go first: if the prefix delete fails the row survives and the
    /// call can be retried, whereas a deleted row would orphan the blobs.
    #[tracing::instrument(skip(self), fields(media_id = %media_id))]
    pub async fn delete_media(&self, media_id: Uuid) -> Result<(), AppError> {
        let asset = self
            .assets
            .find_by_id(media_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no media asset with id {}", media_id)))?;

        let prefix = asset_prefix(asset.kind, asset.public_id);
        let deleted = self.blobs.delete_prefix(&prefix).await?;
        tracing::info!(
            media_id = %media_id,
            correlation_id = %asset.public_id,
            blobs_deleted = deleted,
            "deleted asset blobs"
        );

        if !self.assets.delete(media_id).await? {
            // Lost a race with a concurrent delete after the lookup.
            return Err(AppError::NotFound(format!(
                "no media asset with id {}",
                media_id
            )));
        }

        tracing::info!(media_id = %media_id, "deleted media asset");
        Ok(())
    }
}

//! Read-side queries: per-asset status and post media listings.

use std::sync::Arc;

use uuid::Uuid;

use medley_core::models::{AssetKind, AssetStatusResponse, MediaAsset, MediaItemResponse};
use medley_core::AppError;
use medley_db::AssetStore;
use medley_storage::BlobStore;

#[derive(Clone)]
pub struct StatusQueryService {
    assets: Arc<dyn AssetStore>,
    blobs: Arc<dyn BlobStore>,
}

impl StatusQueryService {
    pub fn new(assets: Arc<dyn AssetStore>, blobs: Arc<dyn BlobStore>) -> Self {
        StatusQueryService { assets, blobs }
    }

    /// Status envelope for a video. Outputs appear only once the asset is
    /// ready; until then clients poll `status` and `progress`.
    pub async fn video_status(
        &self,
        correlation_id: Uuid,
    ) -> Result<AssetStatusResponse, AppError> {
        let asset = self.find_kind(correlation_id, AssetKind::Video).await?;
        Ok(AssetStatusResponse::from_asset(&asset, None))
    }

    /// Status envelope for an image. The original's public URL rides along
    /// in every state, since images render from the raw upload while
    /// variants are pending.
    pub async fn image_status(
        &self,
        correlation_id: Uuid,
    ) -> Result<AssetStatusResponse, AppError> {
        let asset = self.find_kind(correlation_id, AssetKind::Image).await?;
        let original_url = Some(self.blobs.public_url(&asset.raw_key));
        Ok(AssetStatusResponse::from_asset(&asset, original_url))
    }

    /// Displayable media of a post in display order.
    pub async fn post_media(&self, post_id: Uuid) -> Result<Vec<MediaItemResponse>, AppError> {
        let assets = self.assets.list_by_post(post_id).await?;
        Ok(assets
            .iter()
            .filter(|asset| asset.is_displayable())
            .map(|asset| {
                let original_url = match asset.kind {
                    AssetKind::Image => Some(self.blobs.public_url(&asset.raw_key)),
                    AssetKind::Video => None,
                };
                MediaItemResponse::from_asset(asset, original_url)
            })
            .collect())
    }

    async fn find_kind(
        &self,
        correlation_id: Uuid,
        kind: AssetKind,
    ) -> Result<MediaAsset, AppError> {
        match self.assets.find_by_public_id(correlation_id).await? {
            Some(asset) if asset.kind == kind => Ok(asset),
            _ => Err(AppError::NotFound(format!(
                "no {} asset for correlation id {}",
                kind, correlation_id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medley_core::models::{AssetChange, AssetStatus, ImageVariants, NewAsset, VideoOutputs};
    use medley_db::{ExpectedStatus, MemoryAssetStore};
    use medley_storage::MemoryBlobStore;

    struct Fixture {
        assets: Arc<MemoryAssetStore>,
        service: StatusQueryService,
    }

    fn fixture() -> Fixture {
        let assets = Arc::new(MemoryAssetStore::new());
        let service = StatusQueryService::new(assets.clone(), Arc::new(MemoryBlobStore::new()));
        Fixture { assets, service }
    }

    async fn seed(f: &Fixture, kind: AssetKind, post_id: Option<Uuid>, sort_order: i32) -> Uuid {
        let public_id = Uuid::new_v4();
        let folder = match kind {
            AssetKind::Video => "videos",
            AssetKind::Image => "images",
        };
        f.assets
            .create(NewAsset {
                public_id,
                post_id,
                kind,
                raw_key: format!("media/{}/{}/original.bin", folder, public_id),
                file_size: None,
                content_type: None,
                original_filename: None,
                sort_order,
            })
            .await
            .unwrap();
        public_id
    }

    async fn make_video_ready(f: &Fixture, public_id: Uuid) {
        f.assets
            .transition(
                public_id,
                ExpectedStatus::Any,
                AssetChange::video_ready(VideoOutputs {
                    playlist_url: "https://cdn.example.com/master.m3u8".to_string(),
                    thumbnail_url: None,
                    duration_secs: None,
                    width: None,
                    height: None,
                }),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_video_status_hides_outputs_until_ready() {
        let f = fixture();
        let video_id = seed(&f, AssetKind::Video, None, 0).await;

        let status = f.service.video_status(video_id).await.unwrap();
        assert_eq!(status.status, AssetStatus::Uploading);
        assert!(status.outputs.is_none());
        assert!(status.original_url.is_none());

        make_video_ready(&f, video_id).await;
        let status = f.service.video_status(video_id).await.unwrap();
        assert_eq!(status.status, AssetStatus::Ready);
        assert!(status.outputs.is_some());
    }

    #[tokio::test]
    async fn test_image_status_always_carries_original_url() {
        let f = fixture();
        let image_id = seed(&f, AssetKind::Image, None, 0).await;

        let status = f.service.image_status(image_id).await.unwrap();
        assert_eq!(status.status, AssetStatus::Uploading);
        let url = status.original_url.expect("original url present");
        assert!(url.contains(&image_id.to_string()));
    }

    #[tokio::test]
    async fn test_kind_mismatch_is_not_found() {
        let f = fixture();
        let image_id = seed(&f, AssetKind::Image, None, 0).await;
        assert!(matches!(
            f.service.video_status(image_id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            f.service.image_status(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_post_media_filters_pending_videos_and_keeps_images() {
        let f = fixture();
        let post_id = Uuid::new_v4();

        let pending_video = seed(&f, AssetKind::Video, Some(post_id), 0).await;
        let ready_video = seed(&f, AssetKind::Video, Some(post_id), 1).await;
        make_video_ready(&f, ready_video).await;
        let pending_image = seed(&f, AssetKind::Image, Some(post_id), 2).await;

        let items = f.service.post_media(post_id).await.unwrap();
        let ids: Vec<Uuid> = items.iter().map(|i| i.correlation_id).collect();

        assert_eq!(ids, vec![ready_video, pending_image]);
        assert!(!ids.contains(&pending_video));

        // pending image renders from the original upload
        let image_item = items.last().unwrap();
        assert!(image_item.outputs.is_none());
        assert!(image_item.original_url.is_some());
    }

    #[tokio::test]
    async fn test_post_media_respects_sort_order() {
        let f = fixture();
        let post_id = Uuid::new_v4();

        let second = seed(&f, AssetKind::Image, Some(post_id), 5).await;
        let first = seed(&f, AssetKind::Image, Some(post_id), 1).await;

        let items = f.service.post_media(post_id).await.unwrap();
        let ids: Vec<Uuid> = items.iter().map(|i| i.correlation_id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn test_image_ready_exposes_variants() {
        let f = fixture();
        let image_id = seed(&f, AssetKind::Image, None, 0).await;
        f.assets
            .transition(
                image_id,
                ExpectedStatus::Any,
                AssetChange::image_ready(medley_core::models::ImageOutputs {
                    variants: ImageVariants {
                        thumbnail: "t".to_string(),
                        medium: "m".to_string(),
                        large: "l".to_string(),
                    },
                    blurhash: None,
                    width: None,
                    height: None,
                }),
            )
            .await
            .unwrap();

        let status = f.service.image_status(image_id).await.unwrap();
        assert_eq!(status.status, AssetStatus::Ready);
        assert!(status.outputs.is_some());
        assert!(status.original_url.is_some());
    }
}

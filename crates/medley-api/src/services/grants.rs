//! Direct-upload grants.
//!
//! Clients never push bytes through this service; they receive a presigned
//! PUT URL and upload straight to blob storage. The correlation id minted
//! here identifies the asset in every later call.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use medley_core::models::{AssetKind, NewAsset, UploadGrantRequest, UploadGrantResponse};
use medley_core::validation::file_extension;
use medley_core::{AppError, UploadPolicy};
use medley_db::AssetStore;
use medley_storage::{image_source_key, video_source_key, BlobStore};

#[derive(Clone)]
pub struct GrantService {
    assets: Arc<dyn AssetStore>,
    blobs: Arc<dyn BlobStore>,
    image_policy: UploadPolicy,
    video_policy: UploadPolicy,
    url_ttl: Duration,
}

impl GrantService {
    pub fn new(
        assets: Arc<dyn AssetStore>,
        blobs: Arc<dyn BlobStore>,
        image_policy: UploadPolicy,
        video_policy: UploadPolicy,
        url_ttl: Duration,
    ) -> Self {
        GrantService {
            assets,
            blobs,
            image_policy,
            video_policy,
            url_ttl,
        }
    }

    /// Issue a grant for a video upload.
    ///
    /// The asset row is created here, before any byte is uploaded, so the
    /// raw key is fixed at grant time and progress callbacks always have a
    /// row to land on.
    #[tracing::instrument(skip(self, request), fields(filename = %request.filename, file_size = request.file_size))]
    pub async fn grant_video_upload(
        &self,
        request: UploadGrantRequest,
    ) -> Result<UploadGrantResponse, AppError> {
        self.video_policy
            .validate(&request.filename, &request.content_type, request.file_size)?;

        let public_id = Uuid::new_v4();
        let raw_key = video_source_key(public_id, &file_extension(&request.filename));
        let upload_url = self
            .blobs
            .presigned_put_url(&raw_key, &request.content_type, self.url_ttl)
            .await?;

        let asset = self
            .assets
            .create(NewAsset {
                public_id,
                post_id: request.post_id,
                kind: AssetKind::Video,
                raw_key: raw_key.clone(),
                file_size: Some(request.file_size),
                content_type: Some(request.content_type),
                original_filename: Some(request.filename),
                sort_order: request.sort_order.unwrap_or(0),
            })
            .await?;

        tracing::info!(
            correlation_id = %asset.public_id,
            media_id = %asset.id,
            "issued video upload grant"
        );

        Ok(UploadGrantResponse {
            upload_url,
            correlation_id: public_id,
            raw_path: raw_key,
            expires_in_secs: self.url_ttl.as_secs(),
        })
    }

    /// Issue a grant for an image upload.
    ///
    /// No asset row yet: an image record exists only once the upload has
    /// been confirmed, so abandoned grants leave nothing behind.
    #[tracing::instrument(skip(self, request), fields(filename = %request.filename, file_size = request.file_size))]
    pub async fn grant_image_upload(
        &self,
        request: UploadGrantRequest,
    ) -> Result<UploadGrantResponse, AppError> {
        self.image_policy
            .validate(&request.filename, &request.content_type, request.file_size)?;

        let public_id = Uuid::new_v4();
        let raw_key = image_source_key(public_id, &file_extension(&request.filename));
        let upload_url = self
            .blobs
            .presigned_put_url(&raw_key, &request.content_type, self.url_ttl)
            .await?;

        tracing::info!(correlation_id = %public_id, "issued image upload grant");

        Ok(UploadGrantResponse {
            upload_url,
            correlation_id: public_id,
            raw_path: raw_key,
            expires_in_secs: self.url_ttl.as_secs(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medley_db::MemoryAssetStore;
    use medley_storage::MemoryBlobStore;

    fn service(assets: Arc<MemoryAssetStore>) -> GrantService {
        GrantService::new(
            assets,
            Arc::new(MemoryBlobStore::new()),
            UploadPolicy::new(
                10 * 1024 * 1024,
                vec!["jpg".into(), "png".into()],
                vec!["image/jpeg".into(), "image/png".into()],
            ),
            UploadPolicy::new(
                500 * 1024 * 1024,
                vec!["mp4".into(), "mov".into()],
                vec!["video/mp4".into(), "video/quicktime".into()],
            ),
            Duration::from_secs(900),
        )
    }

    fn grant_request(filename: &str, content_type: &str, file_size: i64) -> UploadGrantRequest {
        UploadGrantRequest {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            file_size,
            post_id: None,
            sort_order: None,
        }
    }

    #[tokio::test]
    async fn test_video_grant_creates_asset_row() {
        let assets = Arc::new(MemoryAssetStore::new());
        let service = service(assets.clone());

        let grant = service
            .grant_video_upload(grant_request("clip.mp4", "video/mp4", 2048))
            .await
            .unwrap();

        assert_eq!(grant.expires_in_secs, 900);
        assert!(grant.raw_path.ends_with("/original.mp4"));
        assert!(grant.raw_path.starts_with("media/videos/"));

        let asset = assets
            .find_by_public_id(grant.correlation_id)
            .await
            .unwrap()
            .expect("asset row created at grant time");
        assert_eq!(asset.raw_key, grant.raw_path);
        assert_eq!(asset.kind, AssetKind::Video);
    }

    #[tokio::test]
    async fn test_image_grant_creates_no_asset_row() {
        let assets = Arc::new(MemoryAssetStore::new());
        let service = service(assets.clone());

        let grant = service
            .grant_image_upload(grant_request("photo.png", "image/png", 1024))
            .await
            .unwrap();

        assert!(grant.raw_path.starts_with("media/images/"));
        assert!(assets
            .find_by_public_id(grant.correlation_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_policy_violations_are_rejected() {
        let service = service(Arc::new(MemoryAssetStore::new()));

        let oversized = service
            .grant_image_upload(grant_request("big.png", "image/png", 11 * 1024 * 1024))
            .await;
        assert!(matches!(oversized, Err(AppError::InvalidInput(_))));

        let wrong_type = service
            .grant_video_upload(grant_request("clip.mp4", "image/png", 2048))
            .await;
        assert!(matches!(wrong_type, Err(AppError::InvalidInput(_))));
    }
}

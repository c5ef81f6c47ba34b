//! Upload confirmation and job dispatch.
//!
//! Confirming an upload is the hand-off point between the client-driven
//! upload phase and the pipeline-driven processing phase. Exactly one job
//! is submitted per confirmation; repeated confirms return the current
//! state instead of queueing duplicate work.

use std::sync::Arc;

use uuid::Uuid;

use medley_core::constants::DISPATCH_FAILED_MESSAGE;
use medley_core::models::{
    AssetChange, AssetKind, AssetStatus, ConfirmImageRequest, ConfirmResponse,
    ConfirmVideoRequest, MediaAsset, NewAsset,
};
use medley_core::AppError;
use medley_db::{AssetStore, ExpectedStatus, StoreError};
use medley_pipeline::{JobPipeline, ProcessingJob};
use medley_storage::{video_source_key, BlobStore};

#[derive(Clone)]
pub struct DispatchService {
    assets: Arc<dyn AssetStore>,
    blobs: Arc<dyn BlobStore>,
    pipeline: Arc<dyn JobPipeline>,
}

impl DispatchService {
    pub fn new(
        assets: Arc<dyn AssetStore>,
        blobs: Arc<dyn BlobStore>,
        pipeline: Arc<dyn JobPipeline>,
    ) -> Self {
        DispatchService {
            assets,
            blobs,
            pipeline,
        }
    }

    /// Confirm a granted video upload and queue it for transcoding.
    #[tracing::instrument(skip(self, request), fields(correlation_id = %request.correlation_id))]
    pub async fn confirm_video(
        &self,
        request: ConfirmVideoRequest,
    ) -> Result<ConfirmResponse, AppError> {
        let asset = match self.assets.find_by_public_id(request.correlation_id).await? {
            Some(asset) => asset,
            None => {
                self.recreate_video_asset(request.correlation_id, request.post_id)
                    .await?
            }
        };

        if asset.status != AssetStatus::Uploading {
            tracing::info!(
                correlation_id = %asset.public_id,
                status = %asset.status,
                "video already confirmed, returning current state"
            );
            return Ok(ConfirmResponse::from_asset(&asset));
        }

        let job = ProcessingJob::new(asset.public_id, AssetKind::Video, asset.raw_key.clone());
        self.submit_and_transition(asset, job, request.post_id, AssetChange::dispatched)
            .await
    }

    /// Confirm a granted image upload: verify the object actually landed,
    /// create the record, then queue variant generation.
    #[tracing::instrument(skip(self, request), fields(correlation_id = %request.correlation_id))]
    pub async fn confirm_image(
        &self,
        request: ConfirmImageRequest,
    ) -> Result<ConfirmResponse, AppError> {
        if !self.blobs.exists(&request.raw_path).await? {
            return Err(AppError::PreconditionFailed(format!(
                "no uploaded object found at {}",
                request.raw_path
            )));
        }

        let asset = match self
            .assets
            .create(NewAsset {
                public_id: request.correlation_id,
                post_id: request.post_id,
                kind: AssetKind::Image,
                raw_key: request.raw_path.clone(),
                file_size: request.file_size,
                content_type: request.content_type.clone(),
                original_filename: request.original_filename.clone(),
                sort_order: request.sort_order.unwrap_or(0),
            })
            .await
        {
            Ok(asset) => asset,
            Err(StoreError::Duplicate) => {
                let existing = self.require_asset(request.correlation_id).await?;
                // Repeat confirm. Re-dispatch only when the earlier attempt
                // never queued a job; otherwise report the current state.
                if existing.status != AssetStatus::Uploading {
                    tracing::info!(
                        correlation_id = %existing.public_id,
                        status = %existing.status,
                        "image already confirmed, returning current state"
                    );
                    return Ok(ConfirmResponse::from_asset(&existing));
                }
                existing
            }
            Err(err) => return Err(err.into()),
        };

        let job = ProcessingJob::new(asset.public_id, AssetKind::Image, asset.raw_key.clone());
        self.submit_and_transition(asset, job, request.post_id, AssetChange::processing)
            .await
    }

    /// The grant creates the video row, so a missing one means the record
    /// was lost. Recreate it rather than stranding the uploaded blob; the
    /// original extension is gone, so the canonical container is assumed.
    async fn recreate_video_asset(
        &self,
        public_id: Uuid,
        post_id: Option<Uuid>,
    ) -> Result<MediaAsset, AppError> {
        tracing::warn!(
            correlation_id = %public_id,
            "video confirm for unknown correlation id, recreating record"
        );
        let raw_key = video_source_key(public_id, "mp4");
        match self
            .assets
            .create(NewAsset {
                public_id,
                post_id,
                kind: AssetKind::Video,
                raw_key,
                file_size: None,
                content_type: None,
                original_filename: None,
                sort_order: 0,
            })
            .await
        {
            Ok(asset) => Ok(asset),
            // Lost a race with a concurrent confirm; take its row.
            Err(StoreError::Duplicate) => self.require_asset(public_id).await,
            Err(err) => Err(err.into()),
        }
    }

    async fn require_asset(&self, public_id: Uuid) -> Result<MediaAsset, AppError> {
        self.assets
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| AppError::NotFound("media asset not found".to_string()))
    }

    async fn submit_and_transition(
        &self,
        asset: MediaAsset,
        job: ProcessingJob,
        post_id: Option<Uuid>,
        change_for: fn(Uuid) -> AssetChange,
    ) -> Result<ConfirmResponse, AppError> {
        if let Err(err) = self.pipeline.submit(&job).await {
            tracing::error!(
                correlation_id = %asset.public_id,
                job_id = %job.job_id,
                error = %err,
                "job submission failed"
            );
            // Surface the failure on the asset before bubbling the dispatch
            // error; the record must not stay in Uploading forever.
            if let Err(store_err) = self
                .assets
                .transition(
                    asset.public_id,
                    ExpectedStatus::Any,
                    AssetChange::failed(DISPATCH_FAILED_MESSAGE),
                )
                .await
            {
                tracing::error!(
                    correlation_id = %asset.public_id,
                    error = %store_err,
                    "failed to record dispatch failure"
                );
            }
            return Err(err.into());
        }

        let mut change = change_for(job.job_id);
        if let Some(post_id) = post_id {
            change = change.with_post(post_id);
        }
        let transitioned = self
            .assets
            .transition(asset.public_id, ExpectedStatus::Any, change)
            .await?;

        tracing::info!(
            correlation_id = %transitioned.asset.public_id,
            job_id = %job.job_id,
            status = %transitioned.asset.status,
            "queued processing job"
        );
        Ok(ConfirmResponse::from_asset(&transitioned.asset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medley_db::MemoryAssetStore;
    use medley_pipeline::FakeJobPipeline;
    use medley_storage::MemoryBlobStore;

    struct Fixture {
        assets: Arc<MemoryAssetStore>,
        blobs: Arc<MemoryBlobStore>,
        pipeline: Arc<FakeJobPipeline>,
        service: DispatchService,
    }

    fn fixture() -> Fixture {
        let assets = Arc::new(MemoryAssetStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let pipeline = Arc::new(FakeJobPipeline::new());
        let service = DispatchService::new(assets.clone(), blobs.clone(), pipeline.clone());
        Fixture {
            assets,
            blobs,
            pipeline,
            service,
        }
    }

    async fn seed_video(assets: &MemoryAssetStore) -> MediaAsset {
        let public_id = Uuid::new_v4();
        assets
            .create(NewAsset {
                public_id,
                post_id: None,
                kind: AssetKind::Video,
                raw_key: format!("media/videos/{}/original.mp4", public_id),
                file_size: Some(2048),
                content_type: Some("video/mp4".to_string()),
                original_filename: Some("clip.mp4".to_string()),
                sort_order: 0,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_confirm_video_dispatches_and_transitions() {
        let f = fixture();
        let seeded = seed_video(&f.assets).await;

        let response = f
            .service
            .confirm_video(ConfirmVideoRequest {
                correlation_id: seeded.public_id,
                post_id: None,
            })
            .await
            .unwrap();

        assert_eq!(response.status, AssetStatus::Transcoding);
        let job_id = response.job_correlation_id.expect("job id set");

        let submitted = f.pipeline.submitted().await;
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].job_id, job_id);
        assert_eq!(submitted[0].public_id, seeded.public_id);
        assert_eq!(submitted[0].source_key, seeded.raw_key);
    }

    #[tokio::test]
    async fn test_confirm_video_attaches_post() {
        let f = fixture();
        let seeded = seed_video(&f.assets).await;
        let post_id = Uuid::new_v4();

        f.service
            .confirm_video(ConfirmVideoRequest {
                correlation_id: seeded.public_id,
                post_id: Some(post_id),
            })
            .await
            .unwrap();

        let stored = f
            .assets
            .find_by_public_id(seeded.public_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.post_id, Some(post_id));
    }

    #[tokio::test]
    async fn test_repeat_video_confirm_does_not_resubmit() {
        let f = fixture();
        let seeded = seed_video(&f.assets).await;
        let request = || ConfirmVideoRequest {
            correlation_id: seeded.public_id,
            post_id: None,
        };

        let first = f.service.confirm_video(request()).await.unwrap();
        let second = f.service.confirm_video(request()).await.unwrap();

        assert_eq!(f.pipeline.submitted_count().await, 1);
        assert_eq!(second.status, AssetStatus::Transcoding);
        assert_eq!(second.job_correlation_id, first.job_correlation_id);
    }

    #[tokio::test]
    async fn test_confirm_video_recreates_missing_record() {
        let f = fixture();
        let correlation_id = Uuid::new_v4();

        let response = f
            .service
            .confirm_video(ConfirmVideoRequest {
                correlation_id,
                post_id: None,
            })
            .await
            .unwrap();

        assert_eq!(response.correlation_id, correlation_id);
        assert_eq!(response.status, AssetStatus::Transcoding);
        let stored = f
            .assets
            .find_by_public_id(correlation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored.raw_key,
            format!("media/videos/{}/original.mp4", correlation_id)
        );
    }

    #[tokio::test]
    async fn test_dispatch_failure_marks_asset_error() {
        let f = fixture();
        let seeded = seed_video(&f.assets).await;
        f.pipeline.set_failing(true);

        let result = f
            .service
            .confirm_video(ConfirmVideoRequest {
                correlation_id: seeded.public_id,
                post_id: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::DispatchFailed(_))));
        let stored = f
            .assets
            .find_by_public_id(seeded.public_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, AssetStatus::Error);
        assert_eq!(
            stored.error_message.as_deref(),
            Some("failed to queue processing")
        );
        assert!(stored.job_id.is_none());
    }

    #[tokio::test]
    async fn test_confirm_image_requires_uploaded_object() {
        let f = fixture();
        let correlation_id = Uuid::new_v4();

        let result = f
            .service
            .confirm_image(ConfirmImageRequest {
                correlation_id,
                raw_path: format!("media/images/{}/original.png", correlation_id),
                post_id: None,
                original_filename: None,
                content_type: None,
                file_size: None,
                sort_order: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::PreconditionFailed(_))));
        // the failed precondition must not leave a record behind
        assert!(f
            .assets
            .find_by_public_id(correlation_id)
            .await
            .unwrap()
            .is_none());
        assert_eq!(f.pipeline.submitted_count().await, 0);
    }

    #[tokio::test]
    async fn test_confirm_image_creates_record_and_dispatches() {
        let f = fixture();
        let correlation_id = Uuid::new_v4();
        let raw_path = format!("media/images/{}/original.png", correlation_id);
        f.blobs.insert(&raw_path).await;

        let response = f
            .service
            .confirm_image(ConfirmImageRequest {
                correlation_id,
                raw_path: raw_path.clone(),
                post_id: None,
                original_filename: Some("photo.png".to_string()),
                content_type: Some("image/png".to_string()),
                file_size: Some(1024),
                sort_order: Some(2),
            })
            .await
            .unwrap();

        assert_eq!(response.status, AssetStatus::Processing);
        assert!(response.job_correlation_id.is_some());

        let stored = f
            .assets
            .find_by_public_id(correlation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.kind, AssetKind::Image);
        assert_eq!(stored.raw_key, raw_path);
        assert_eq!(stored.sort_order, 2);
    }

    #[tokio::test]
    async fn test_repeat_image_confirm_returns_current_state() {
        let f = fixture();
        let correlation_id = Uuid::new_v4();
        let raw_path = format!("media/images/{}/original.png", correlation_id);
        f.blobs.insert(&raw_path).await;
        let request = || ConfirmImageRequest {
            correlation_id,
            raw_path: raw_path.clone(),
            post_id: None,
            original_filename: None,
            content_type: None,
            file_size: None,
            sort_order: None,
        };

        let first = f.service.confirm_image(request()).await.unwrap();
        let second = f.service.confirm_image(request()).await.unwrap();

        assert_eq!(f.pipeline.submitted_count().await, 1);
        assert_eq!(second.status, AssetStatus::Processing);
        assert_eq!(second.job_correlation_id, first.job_correlation_id);
    }
}

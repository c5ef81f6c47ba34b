//! Processing pipeline abstraction trait

use async_trait::async_trait;
use medley_core::models::AssetKind;
use medley_core::AppError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Pipeline submission errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The pipeline answered but refused the job
    #[error("Pipeline rejected job: {0}")]
    Rejected(String),

    /// The pipeline could not be reached
    #[error("Pipeline transport error: {0}")]
    Transport(String),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::DispatchFailed(err.to_string())
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// A job handed to the processing pipeline.
///
/// `job_id` is minted fresh per submission and echoed back in callbacks;
/// `public_id` is the client-facing correlation id of the asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessingJob {
    pub job_id: Uuid,
    pub public_id: Uuid,
    pub kind: AssetKind,
    pub source_key: String,
}

impl ProcessingJob {
    pub fn new(public_id: Uuid, kind: AssetKind, source_key: String) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            public_id,
            kind,
            source_key,
        }
    }
}

/// Processing pipeline abstraction
///
/// Submission is fire-and-forget: a successful return means the pipeline
/// accepted the job, not that processing finished. Results arrive later on
/// the callback endpoints.
#[async_trait]
pub trait JobPipeline: Send + Sync {
    async fn submit(&self, job: &ProcessingJob) -> PipelineResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_mints_fresh_job_id() {
        let public_id = Uuid::new_v4();
        let a = ProcessingJob::new(public_id, AssetKind::Video, "k".to_string());
        let b = ProcessingJob::new(public_id, AssetKind::Video, "k".to_string());
        assert_ne!(a.job_id, b.job_id);
        assert_eq!(a.public_id, b.public_id);
    }

    #[test]
    fn test_job_serializes_kind_lowercase() {
        let job = ProcessingJob::new(
            Uuid::new_v4(),
            AssetKind::Image,
            "media/images/x/original.png".to_string(),
        );
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["kind"], "image");
        assert_eq!(value["source_key"], "media/images/x/original.png");
    }
}

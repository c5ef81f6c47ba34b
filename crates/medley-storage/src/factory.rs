use crate::{BlobStore, MemoryBlobStore, S3BlobStore, StorageBackend, StorageError, StorageResult};
use medley_core::Config;
use std::sync::Arc;

/// Create a blob store backend based on configuration
pub async fn create_blob_store(config: &Config) -> StorageResult<Arc<dyn BlobStore>> {
    match config.storage_backend {
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config
                .s3_region
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_REGION not configured".to_string()))?;
            let endpoint = config.s3_endpoint.clone();

            let store = S3BlobStore::new(bucket, region, endpoint).await?;
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory blob store; uploads will not survive a restart");
            Ok(Arc::new(MemoryBlobStore::new()))
        }
    }
}

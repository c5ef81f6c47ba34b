use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::StreamExt;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStore, ObjectStoreExt, Result as ObjectResult};
use std::time::Duration;

/// S3 blob store implementation
#[derive(Clone)]
pub struct S3BlobStore {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3BlobStore {
    /// Create a new S3BlobStore instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Build AmazonS3 object store from environment and explicit settings.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3BlobStore {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Generate public URL for an S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path-style with the configured endpoint
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn presigned_put_url(
        &self,
        key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let location = Path::from(key.to_string());
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::PUT, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?
            .to_string();

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            expires_in_secs = expires_in.as_secs(),
            "Generated presigned PUT URL"
        );

        Ok(url)
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = Path::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn delete_prefix(&self, prefix: &str) -> StorageResult<u64> {
        let start = std::time::Instant::now();
        let location = Path::from(prefix.to_string());
        let mut entries = self.store.list(Some(&location));
        let mut deleted: u64 = 0;

        while let Some(entry) = entries.next().await {
            let meta = entry.map_err(|e| StorageError::BackendError(e.to_string()))?;
            let result: ObjectResult<_> = self.store.delete(&meta.location).await;
            match result {
                Ok(_) => deleted += 1,
                // Another delete raced us; the object is gone either way
                Err(ObjectStoreError::NotFound { .. }) => {}
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        bucket = %self.bucket,
                        key = %meta.location,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "S3 prefix delete failed"
                    );
                    return Err(StorageError::DeleteFailed(e.to_string()));
                }
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            prefix = %prefix,
            deleted = deleted,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 prefix delete successful"
        );

        Ok(deleted)
    }

    fn public_url(&self, key: &str) -> String {
        self.generate_url(key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

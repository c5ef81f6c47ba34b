//! Blob storage abstraction trait
//!
//! This module defines the BlobStore trait that all storage backends must
//! implement.

use crate::StorageBackend;
use async_trait::async_trait;
use medley_core::AppError;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Presign failed: {0}")]
    PresignFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            StorageError::PresignFailed(_)
            | StorageError::DeleteFailed(_)
            | StorageError::BackendError(_) => AppError::Storage(err.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Blob storage abstraction trait
///
/// Backends hold opaque blobs addressed by key. Uploads happen out of band
/// through presigned URLs, so the trait surface is intentionally small:
/// presign, probe, delete, and URL construction.
///
/// **Key format:** keys are asset-scoped, `media/{videos|images}/{public_id}/...`.
/// See the crate root documentation.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Generate a presigned PUT URL for a direct client upload.
    ///
    /// The URL is time-limited; after it expires the client must request a
    /// new grant.
    async fn presigned_put_url(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Check whether an object exists at the given key.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Delete every object under the given prefix, returning how many were
    /// removed. A prefix with no objects is not an error.
    async fn delete_prefix(&self, prefix: &str) -> StorageResult<u64>;

    /// Construct the public URL for an object key.
    fn public_url(&self, key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

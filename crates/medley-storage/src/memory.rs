//! In-memory blob store
//!
//! Holds only the set of keys that "exist" plus synthesized URLs. Uploads
//! happen out of band in production, so tests stand in for the client by
//! inserting keys directly.

use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashSet<String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as uploaded, standing in for the client's direct PUT.
    pub async fn insert(&self, key: &str) {
        self.objects.lock().await.insert(key.to_string());
    }

    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn presigned_put_url(
        &self,
        key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if key.starts_with('/') || key.contains("..") {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(format!(
            "memory://uploads/{}?expires_in={}",
            key,
            expires_in.as_secs()
        ))
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().await.contains(key))
    }

    async fn delete_prefix(&self, prefix: &str) -> StorageResult<u64> {
        // Prefixes are directories: "media/videos/ab" must not match
        // "media/videos/abc/..."
        let dir = format!("{}/", prefix.trim_end_matches('/'));
        let mut objects = self.objects.lock().await;
        let mut deleted: u64 = 0;
        objects.retain(|key| {
            if key.starts_with(&dir) {
                deleted += 1;
                false
            } else {
                true
            }
        });
        Ok(deleted)
    }

    fn public_url(&self, key: &str) -> String {
        format!("memory://blobs/{}", key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_then_exists() {
        let store = MemoryBlobStore::new();
        assert!(!store.exists("media/images/a/original.png").await.unwrap());

        store.insert("media/images/a/original.png").await;
        assert!(store.exists("media/images/a/original.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_prefix_respects_directory_boundary() {
        let store = MemoryBlobStore::new();
        store.insert("media/videos/ab/original.mp4").await;
        store.insert("media/videos/ab/hls/master.m3u8").await;
        store.insert("media/videos/abc/original.mp4").await;

        let deleted = store.delete_prefix("media/videos/ab").await.unwrap();
        assert_eq!(deleted, 2);
        assert!(!store.exists("media/videos/ab/original.mp4").await.unwrap());
        assert!(store.exists("media/videos/abc/original.mp4").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_prefix_on_empty_prefix_is_zero() {
        let store = MemoryBlobStore::new();
        assert_eq!(store.delete_prefix("media/videos/none").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_presigned_url_carries_key_and_ttl() {
        let store = MemoryBlobStore::new();
        let url = store
            .presigned_put_url("media/images/a/original.png", "image/png", Duration::from_secs(900))
            .await
            .unwrap();
        assert!(url.contains("media/images/a/original.png"));
        assert!(url.ends_with("expires_in=900"));
    }

    #[tokio::test]
    async fn test_presigned_url_rejects_traversal() {
        let store = MemoryBlobStore::new();
        let err = store
            .presigned_put_url("media/../secrets", "image/png", Duration::from_secs(900))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}

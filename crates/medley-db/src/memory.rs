//! In-memory asset store
//!
//! Backs tests and local development. A single write lock over the asset
//! map makes `transition` atomic: the guard decision and the field writes
//! happen under one critical section, mirroring the row lock the Postgres
//! adapter takes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medley_core::models::{AssetChange, MediaAsset, NewAsset};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{
    check_transition, AssetStore, ExpectedStatus, StoreError, StoreResult, Transitioned,
};

#[derive(Default)]
pub struct MemoryAssetStore {
    // Keyed by public_id, the dominant lookup
    assets: RwLock<HashMap<Uuid, MediaAsset>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn create(&self, new: NewAsset) -> StoreResult<MediaAsset> {
        let mut assets = self.assets.write().await;
        if assets.contains_key(&new.public_id) {
            return Err(StoreError::Duplicate);
        }
        let asset = new.into_asset(Utc::now());
        assets.insert(asset.public_id, asset.clone());
        Ok(asset)
    }

    async fn find_by_public_id(&self, public_id: Uuid) -> StoreResult<Option<MediaAsset>> {
        let assets = self.assets.read().await;
        Ok(assets.get(&public_id).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<MediaAsset>> {
        let assets = self.assets.read().await;
        Ok(assets.values().find(|a| a.id == id).cloned())
    }

    async fn transition(
        &self,
        public_id: Uuid,
        expected: ExpectedStatus,
        change: AssetChange,
    ) -> StoreResult<Transitioned> {
        let mut assets = self.assets.write().await;
        let asset = assets.get_mut(&public_id).ok_or(StoreError::NotFound)?;

        if !check_transition(asset, expected, &change)? {
            return Ok(Transitioned {
                asset: asset.clone(),
                applied: false,
            });
        }

        change.apply_to(asset, Utc::now());
        Ok(Transitioned {
            asset: asset.clone(),
            applied: true,
        })
    }

    async fn list_by_post(&self, post_id: Uuid) -> StoreResult<Vec<MediaAsset>> {
        let assets = self.assets.read().await;
        let mut entries: Vec<MediaAsset> = assets
            .values()
            .filter(|a| a.post_id == Some(post_id))
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then(a.uploaded_at.cmp(&b.uploaded_at))
        });
        Ok(entries)
    }

    async fn list_stalled(
        &self,
        older_than: DateTime<Utc>,
        limit: i64,
    ) -> StoreResult<Vec<MediaAsset>> {
        let assets = self.assets.read().await;
        let mut entries: Vec<MediaAsset> = assets
            .values()
            .filter(|a| !a.status.is_terminal() && a.updated_at < older_than)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.updated_at.cmp(&b.updated_at));
        entries.truncate(limit.max(0) as usize);
        Ok(entries)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut assets = self.assets.write().await;
        let key = assets
            .values()
            .find(|a| a.id == id)
            .map(|a| a.public_id);
        match key {
            Some(public_id) => {
                assets.remove(&public_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

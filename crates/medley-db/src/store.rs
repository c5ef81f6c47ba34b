//! Asset store abstraction
//!
//! This module defines the `AssetStore` trait that all store backends must
//! implement, plus the transition types shared by every adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medley_core::models::{AssetChange, AssetStatus, MediaAsset, NewAsset};
use medley_core::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Asset not found")]
    NotFound,

    #[error("Asset already exists for this correlation id")]
    Duplicate,

    #[error("Asset status is {actual}, expected {expected}")]
    Conflict {
        expected: AssetStatus,
        actual: AssetStatus,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored outputs could not be decoded: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("media asset not found".to_string()),
            StoreError::Duplicate => {
                AppError::Conflict("an asset already exists for this correlation id".to_string())
            }
            StoreError::Conflict { expected, actual } => AppError::Conflict(format!(
                "asset status is {}, expected {}",
                actual, expected
            )),
            StoreError::Database(e) => e.into(),
            StoreError::Serialization(e) => e.into(),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Optional compare-and-set guard for [`AssetStore::transition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedStatus {
    Any,
    Is(AssetStatus),
}

/// Outcome of a transition. `applied` is false when the monotonic guard
/// absorbed the write as stale; `asset` is the stored row either way.
#[derive(Debug, Clone)]
pub struct Transitioned {
    pub asset: MediaAsset,
    pub applied: bool,
}

/// Decide what a transition request may do against the loaded row: error on
/// a failed compare-and-set, `Ok(false)` when the write is stale and must
/// be absorbed, `Ok(true)` when it should be applied. Both adapters call
/// this under their respective row lock.
pub(crate) fn check_transition(
    current: &MediaAsset,
    expected: ExpectedStatus,
    change: &AssetChange,
) -> StoreResult<bool> {
    if let ExpectedStatus::Is(status) = expected {
        if current.status != status {
            return Err(StoreError::Conflict {
                expected: status,
                actual: current.status,
            });
        }
    }
    Ok(current.status.accepts(change.status))
}

/// Asset store abstraction
///
/// All backends must provide atomic `transition`: concurrent calls for the
/// same asset must serialize, and a stale write must leave the row
/// untouched.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Insert a new asset. Fails with [`StoreError::Duplicate`] when the
    /// public id is already taken.
    async fn create(&self, new: NewAsset) -> StoreResult<MediaAsset>;

    /// Look up by the client-facing correlation id.
    async fn find_by_public_id(&self, public_id: Uuid) -> StoreResult<Option<MediaAsset>>;

    /// Look up by row id.
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<MediaAsset>>;

    /// Atomically apply `change` to the asset identified by `public_id`,
    /// subject to the expected-status guard and the monotonic status rank.
    async fn transition(
        &self,
        public_id: Uuid,
        expected: ExpectedStatus,
        change: AssetChange,
    ) -> StoreResult<Transitioned>;

    /// All assets of a post, ordered by (sort_order, uploaded_at).
    /// Visibility filtering happens in the service layer.
    async fn list_by_post(&self, post_id: Uuid) -> StoreResult<Vec<MediaAsset>>;

    /// Non-terminal assets that last changed before `older_than`, oldest
    /// first. Feeds the stalled-asset sweeper.
    async fn list_stalled(
        &self,
        older_than: DateTime<Utc>,
        limit: i64,
    ) -> StoreResult<Vec<MediaAsset>>;

    /// Delete by row id. Returns false when no row matched.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

//! Postgres-backed asset store
//!
//! Uses dynamic SQLx queries throughout to avoid requiring
//! DATABASE_URL/sqlx prepare at build time. `transition` serializes
//! concurrent writers per asset with `SELECT ... FOR UPDATE`, then applies
//! the change in Rust so that both adapters share one transition semantics.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medley_core::models::{AssetChange, AssetRow, MediaAsset, NewAsset};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::store::{
    check_transition, AssetStore, ExpectedStatus, StoreError, StoreResult, Transitioned,
};

const ASSET_COLUMNS: &str = "id, post_id, kind, public_id, status, job_id, raw_key, outputs, \
     progress, error_message, sort_order, file_size, content_type, original_filename, \
     uploaded_at, updated_at";

#[derive(Clone)]
pub struct PgAssetStore {
    pool: PgPool,
}

impl PgAssetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn decode(row: Option<AssetRow>) -> StoreResult<Option<MediaAsset>> {
        row.map(|r| r.into_asset())
            .transpose()
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl AssetStore for PgAssetStore {
    #[tracing::instrument(
        skip(self, new),
        fields(db.table = "media_assets", db.operation = "insert", public_id = %new.public_id)
    )]
    async fn create(&self, new: NewAsset) -> StoreResult<MediaAsset> {
        let row = sqlx::query_as::<Postgres, AssetRow>(&format!(
            r#"
            INSERT INTO media_assets (
                id, post_id, kind, public_id, raw_key,
                sort_order, file_size, content_type, original_filename
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ASSET_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new.post_id)
        .bind(new.kind)
        .bind(new.public_id)
        .bind(new.raw_key)
        .bind(new.sort_order)
        .bind(new.file_size)
        .bind(new.content_type)
        .bind(new.original_filename)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
            _ => StoreError::Database(e),
        })?;

        row.into_asset().map_err(StoreError::from)
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "media_assets", db.operation = "select", db.record_id = %public_id)
    )]
    async fn find_by_public_id(&self, public_id: Uuid) -> StoreResult<Option<MediaAsset>> {
        let row = sqlx::query_as::<Postgres, AssetRow>(&format!(
            "SELECT {ASSET_COLUMNS} FROM media_assets WHERE public_id = $1"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        Self::decode(row)
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "media_assets", db.operation = "select", db.record_id = %id)
    )]
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<MediaAsset>> {
        let row = sqlx::query_as::<Postgres, AssetRow>(&format!(
            "SELECT {ASSET_COLUMNS} FROM media_assets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Self::decode(row)
    }

    #[tracing::instrument(
        skip(self, change),
        fields(db.table = "media_assets", db.operation = "update", db.record_id = %public_id)
    )]
    async fn transition(
        &self,
        public_id: Uuid,
        expected: ExpectedStatus,
        change: AssetChange,
    ) -> StoreResult<Transitioned> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent callbacks for the same asset.
        let row = sqlx::query_as::<Postgres, AssetRow>(&format!(
            "SELECT {ASSET_COLUMNS} FROM media_assets WHERE public_id = $1 FOR UPDATE"
        ))
        .bind(public_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(StoreError::NotFound);
        };
        let mut asset = row.into_asset()?;

        if !check_transition(&asset, expected, &change)? {
            tx.rollback().await?;
            return Ok(Transitioned {
                asset,
                applied: false,
            });
        }

        change.apply_to(&mut asset, Utc::now());

        let outputs_json = match &asset.outputs {
            Some(outputs) => Some(serde_json::to_value(outputs)?),
            None => None,
        };

        sqlx::query(
            r#"
            UPDATE media_assets
            SET status = $2, job_id = $3, outputs = $4, progress = $5,
                error_message = $6, post_id = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(asset.id)
        .bind(asset.status)
        .bind(asset.job_id)
        .bind(outputs_json)
        .bind(asset.progress)
        .bind(asset.error_message.clone())
        .bind(asset.post_id)
        .bind(asset.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Transitioned {
            asset,
            applied: true,
        })
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "media_assets", db.operation = "select", post_id = %post_id)
    )]
    async fn list_by_post(&self, post_id: Uuid) -> StoreResult<Vec<MediaAsset>> {
        let rows = sqlx::query_as::<Postgres, AssetRow>(&format!(
            r#"
            SELECT {ASSET_COLUMNS} FROM media_assets
            WHERE post_id = $1
            ORDER BY sort_order ASC, uploaded_at ASC
            "#
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| r.into_asset().map_err(StoreError::from))
            .collect()
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "media_assets", db.operation = "select")
    )]
    async fn list_stalled(
        &self,
        older_than: DateTime<Utc>,
        limit: i64,
    ) -> StoreResult<Vec<MediaAsset>> {
        let rows = sqlx::query_as::<Postgres, AssetRow>(&format!(
            r#"
            SELECT {ASSET_COLUMNS} FROM media_assets
            WHERE status NOT IN ('ready', 'error') AND updated_at < $1
            ORDER BY updated_at ASC
            LIMIT $2
            "#
        ))
        .bind(older_than)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| r.into_asset().map_err(StoreError::from))
            .collect()
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "media_assets", db.operation = "delete", db.record_id = %id)
    )]
    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM media_assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

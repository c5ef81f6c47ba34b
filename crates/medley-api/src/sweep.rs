//! Background sweep for assets stuck in a non-terminal status.
//!
//! An asset whose `updated_at` has not moved for longer than the configured
//! dwell lost its pipeline job somewhere (worker crash, dropped callback).
//! The sweep closes it out through the same compare-and-set transition the
//! callbacks use, so a `ready` racing the sweep wins and the sweep write is
//! absorbed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use medley_core::constants::SWEEP_TIMEOUT_MESSAGE;
use medley_core::models::AssetChange;
use medley_db::{AssetStore, ExpectedStatus, StoreError};

const SWEEP_BATCH_SIZE: i64 = 100;

pub struct StalledAssetSweeper {
    assets: Arc<dyn AssetStore>,
    interval: Duration,
    max_dwell: chrono::Duration,
}

impl StalledAssetSweeper {
    pub fn new(assets: Arc<dyn AssetStore>, interval: Duration, max_dwell_secs: i64) -> Self {
        StalledAssetSweeper {
            assets,
            interval,
            max_dwell: chrono::Duration::seconds(max_dwell_secs),
        }
    }

    /// Spawn the periodic sweep loop.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(err) = self.sweep_once().await {
                    tracing::error!(error = %err, "stalled asset sweep failed");
                }
            }
        })
    }

    /// One sweep pass. Returns how many assets were timed out.
    pub async fn sweep_once(&self) -> Result<u64, StoreError> {
        let cutoff = Utc::now() - self.max_dwell;
        let stalled = self.assets.list_stalled(cutoff, SWEEP_BATCH_SIZE).await?;
        let mut swept = 0;

        for asset in stalled {
            // CAS on the status we listed: if the asset moved on since, the
            // newer write wins and this one is skipped.
            match self
                .assets
                .transition(
                    asset.public_id,
                    ExpectedStatus::Is(asset.status),
                    AssetChange::failed(SWEEP_TIMEOUT_MESSAGE),
                )
                .await
            {
                Ok(transitioned) if transitioned.applied => {
                    swept += 1;
                    tracing::warn!(
                        correlation_id = %asset.public_id,
                        stalled_status = %asset.status,
                        last_update = %asset.updated_at,
                        "timed out stalled asset"
                    );
                }
                Ok(_) => {}
                Err(StoreError::Conflict { .. }) | Err(StoreError::NotFound) => {
                    tracing::debug!(
                        correlation_id = %asset.public_id,
                        "asset moved before sweep could time it out"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        if swept > 0 {
            tracing::info!(swept, "stalled asset sweep complete");
        }
        Ok(swept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medley_core::models::{AssetKind, AssetStatus, NewAsset, VideoOutputs};
    use medley_db::MemoryAssetStore;
    use uuid::Uuid;

    async fn seed(assets: &MemoryAssetStore, kind: AssetKind) -> Uuid {
        let public_id = Uuid::new_v4();
        assets
            .create(NewAsset {
                public_id,
                post_id: None,
                kind,
                raw_key: format!("media/videos/{}/original.mp4", public_id),
                file_size: None,
                content_type: None,
                original_filename: None,
                sort_order: 0,
            })
            .await
            .unwrap();
        public_id
    }

    /// A negative dwell puts the cutoff in the future, so every
    /// non-terminal asset counts as stalled regardless of its age.
    fn eager_sweeper(assets: Arc<MemoryAssetStore>) -> StalledAssetSweeper {
        StalledAssetSweeper::new(assets, Duration::from_secs(3600), -60)
    }

    #[tokio::test]
    async fn test_sweep_times_out_stuck_assets() {
        let assets = Arc::new(MemoryAssetStore::new());
        let stuck = seed(&assets, AssetKind::Video).await;
        let sweeper = eager_sweeper(assets.clone());

        let swept = sweeper.sweep_once().await.unwrap();
        assert_eq!(swept, 1);

        let asset = assets.find_by_public_id(stuck).await.unwrap().unwrap();
        assert_eq!(asset.status, AssetStatus::Error);
        assert_eq!(asset.error_message.as_deref(), Some("processing timed out"));
    }

    #[tokio::test]
    async fn test_sweep_skips_terminal_assets() {
        let assets = Arc::new(MemoryAssetStore::new());
        let done = seed(&assets, AssetKind::Video).await;
        assets
            .transition(
                done,
                ExpectedStatus::Any,
                AssetChange::video_ready(VideoOutputs {
                    playlist_url: "https://cdn.example.com/master.m3u8".to_string(),
                    thumbnail_url: None,
                    duration_secs: None,
                    width: None,
                    height: None,
                }),
            )
            .await
            .unwrap();
        let sweeper = eager_sweeper(assets.clone());

        let swept = sweeper.sweep_once().await.unwrap();
        assert_eq!(swept, 0);

        let asset = assets.find_by_public_id(done).await.unwrap().unwrap();
        assert_eq!(asset.status, AssetStatus::Ready);
    }

    #[tokio::test]
    async fn test_fresh_assets_survive_a_real_dwell() {
        let assets = Arc::new(MemoryAssetStore::new());
        let fresh = seed(&assets, AssetKind::Image).await;
        let sweeper = StalledAssetSweeper::new(assets.clone(), Duration::from_secs(3600), 6 * 3600);

        let swept = sweeper.sweep_once().await.unwrap();
        assert_eq!(swept, 0);

        let asset = assets.find_by_public_id(fresh).await.unwrap().unwrap();
        assert_eq!(asset.status, AssetStatus::Uploading);
    }
}

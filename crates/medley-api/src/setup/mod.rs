//! Application setup and initialization
//!
//! All startup wiring lives here so `main.rs` stays a thin shell and
//! integration tests can assemble the same state over in-memory adapters.

pub mod database;
pub mod routes;
pub mod server;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;

use medley_core::Config;
use medley_db::{AssetStore, PgAssetStore};
use medley_pipeline::{HttpJobPipeline, JobPipeline};
use medley_storage::{create_blob_store, BlobStore};

use crate::services::{
    DispatchService, GrantService, IngestService, MediaLifecycleService, StatusQueryService,
};
use crate::state::{AppState, SecurityConfig};
use crate::sweep::StalledAssetSweeper;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    config.validate().context("Configuration validation failed")?;

    telemetry::init_telemetry(&config);

    tracing::info!("Configuration loaded and validated");

    let pool = database::setup_database(&config).await?;
    let assets: Arc<dyn AssetStore> = Arc::new(PgAssetStore::new(pool));

    let blobs = create_blob_store(&config)
        .await
        .context("Failed to initialize blob storage")?;

    let pipeline: Arc<dyn JobPipeline> = Arc::new(HttpJobPipeline::new(
        config.pipeline_url.clone(),
        config.pipeline_api_key.clone(),
        Duration::from_secs(config.pipeline_timeout_secs),
    )?);

    let state = build_state(&config, assets, blobs, pipeline);

    if config.sweep_enabled {
        let sweeper = Arc::new(StalledAssetSweeper::new(
            state.assets.clone(),
            Duration::from_secs(config.sweep_interval_secs),
            config.sweep_max_dwell_secs,
        ));
        sweeper.start();
        tracing::info!(
            interval_secs = config.sweep_interval_secs,
            max_dwell_secs = config.sweep_max_dwell_secs,
            "Stalled asset sweeper started"
        );
    }

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

/// Wire the service layer over a set of storage adapters.
///
/// Integration tests call this directly with the in-memory adapters so the
/// router under test matches production wiring exactly.
pub fn build_state(
    config: &Config,
    assets: Arc<dyn AssetStore>,
    blobs: Arc<dyn BlobStore>,
    pipeline: Arc<dyn JobPipeline>,
) -> Arc<AppState> {
    let grants = GrantService::new(
        assets.clone(),
        blobs.clone(),
        config.image_policy(),
        config.video_policy(),
        Duration::from_secs(config.upload_url_ttl_secs),
    );
    let dispatch = DispatchService::new(assets.clone(), blobs.clone(), pipeline.clone());
    let ingest = IngestService::new(assets.clone());
    let status = StatusQueryService::new(assets.clone(), blobs.clone());
    let lifecycle = MediaLifecycleService::new(assets.clone(), blobs.clone());

    let security = SecurityConfig {
        callback_secret: config.callback_secret.clone(),
        cors_origins: config.cors_origins.clone(),
    };

    Arc::new(AppState {
        assets,
        blobs,
        pipeline,
        grants,
        dispatch,
        ingest,
        status,
        lifecycle,
        security,
        is_production: config.is_production(),
        config: config.clone(),
    })
}

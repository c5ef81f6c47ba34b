//! Shared application state.
//!
//! One `Arc<AppState>` is built at startup and handed to the router. The
//! capability traits (`AssetStore`, `BlobStore`, `JobPipeline`) are held as
//! trait objects so tests can swap the Postgres/S3/HTTP adapters for the
//! in-memory ones without touching any handler.

use std::sync::Arc;

use axum::extract::FromRef;
use medley_core::Config;
use medley_db::AssetStore;
use medley_pipeline::JobPipeline;
use medley_storage::BlobStore;

use crate::services::{
    DispatchService, GrantService, IngestService, MediaLifecycleService, StatusQueryService,
};

/// Callback authentication and CORS settings.
#[derive(Clone)]
pub struct SecurityConfig {
    pub callback_secret: String,
    pub cors_origins: Vec<String>,
}

pub struct AppState {
    pub assets: Arc<dyn AssetStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub pipeline: Arc<dyn JobPipeline>,
    pub grants: GrantService,
    pub dispatch: DispatchService,
    pub ingest: IngestService,
    pub status: StatusQueryService,
    pub lifecycle: MediaLifecycleService,
    pub security: SecurityConfig,
    pub config: Config,
    pub is_production: bool,
}

impl FromRef<Arc<AppState>> for SecurityConfig {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.security.clone()
    }
}

impl FromRef<Arc<AppState>> for StatusQueryService {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.status.clone()
    }
}

impl FromRef<Arc<AppState>> for IngestService {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.ingest.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}

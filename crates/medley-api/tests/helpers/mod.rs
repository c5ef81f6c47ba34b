//! Test helpers: build AppState and router over the in-memory adapters.
//!
//! Run from workspace root: `cargo test -p medley-api --test video_lifecycle_test`
//! or `cargo test -p medley-api`. No external services required; the asset
//! store, blob store, and pipeline are all in-memory fakes wired through the
//! production `setup::build_state`.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::json;
use uuid::Uuid;

use medley_api::constants;
use medley_api::setup::{self, routes};
use medley_core::{Config, StorageBackend};
use medley_db::{AssetStore, MemoryAssetStore};
use medley_pipeline::{FakeJobPipeline, JobPipeline};
use medley_storage::{BlobStore, MemoryBlobStore};

pub const TEST_CALLBACK_SECRET: &str = "test-callback-secret";

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus direct handles on the in-memory adapters.
pub struct TestApp {
    pub server: TestServer,
    pub assets: Arc<MemoryAssetStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub pipeline: Arc<FakeJobPipeline>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Setup a test app over in-memory adapters.
pub async fn setup_test_app() -> TestApp {
    let assets = Arc::new(MemoryAssetStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let pipeline = Arc::new(FakeJobPipeline::new());

    let config = create_test_config();
    let state = setup::build_state(
        &config,
        assets.clone() as Arc<dyn AssetStore>,
        blobs.clone() as Arc<dyn BlobStore>,
        pipeline.clone() as Arc<dyn JobPipeline>,
    );

    let app = routes::setup_routes(&config, state).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        assets,
        blobs,
        pipeline,
    }
}

/// Request a video upload grant; returns (correlation_id, raw_path).
pub async fn granted_video(app: &TestApp) -> (Uuid, String) {
    let response = app
        .client()
        .post(&api_path("/videos/uploads"))
        .json(&json!({
            "filename": "clip.mp4",
            "content_type": "video/mp4",
            "file_size": 1024 * 1024,
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<serde_json::Value>();
    let correlation_id = body["correlation_id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("grant returns a correlation id");
    let raw_path = body["raw_path"].as_str().expect("grant returns a raw path");
    (correlation_id, raw_path.to_string())
}

/// Grant plus confirm for a video; returns (correlation_id, job_correlation_id).
pub async fn confirmed_video(app: &TestApp) -> (Uuid, Uuid) {
    let (correlation_id, _raw_path) = granted_video(app).await;
    let response = app
        .client()
        .post(&api_path("/videos/uploads/confirm"))
        .json(&json!({ "correlation_id": correlation_id }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<serde_json::Value>();
    let job_id = body["job_correlation_id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("confirm returns a job correlation id");
    (correlation_id, job_id)
}

/// Grant, upload (insert into the memory blob store), and confirm an image;
/// returns the correlation id.
pub async fn uploaded_image(app: &TestApp, post_id: Option<Uuid>) -> Uuid {
    let response = app
        .client()
        .post(&api_path("/images/uploads"))
        .json(&json!({
            "filename": "photo.jpg",
            "content_type": "image/jpeg",
            "file_size": 2048,
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let grant = response.json::<serde_json::Value>();
    let raw_path = grant["raw_path"].as_str().expect("grant returns a raw path");

    app.blobs.insert(raw_path).await;

    let mut confirm = json!({
        "correlation_id": grant["correlation_id"],
        "raw_path": raw_path,
        "original_filename": "photo.jpg",
        "content_type": "image/jpeg",
        "file_size": 2048,
    });
    if let Some(post_id) = post_id {
        confirm["post_id"] = json!(post_id);
    }
    let response = app
        .client()
        .post(&api_path("/images/uploads/confirm"))
        .json(&confirm)
        .await;
    assert_eq!(response.status_code(), 200);

    grant["correlation_id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("grant returns a correlation id")
}

fn create_test_config() -> Config {
    Config {
        server_port: 3000,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        database_url: "postgres://unused-in-memory-tests".to_string(),
        db_max_connections: 5,
        db_timeout_seconds: 30,
        storage_backend: StorageBackend::Memory,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        upload_url_ttl_secs: 900,
        callback_secret: TEST_CALLBACK_SECRET.to_string(),
        pipeline_url: "http://localhost:9100/jobs".to_string(),
        pipeline_api_key: None,
        pipeline_timeout_secs: 10,
        max_image_size_bytes: 10 * 1024 * 1024,
        image_allowed_extensions: vec![
            "jpg".into(),
            "jpeg".into(),
            "png".into(),
            "webp".into(),
        ],
        image_allowed_content_types: vec![
            "image/jpeg".into(),
            "image/png".into(),
            "image/webp".into(),
        ],
        max_video_size_bytes: 100 * 1024 * 1024,
        video_allowed_extensions: vec!["mp4".into(), "mov".into()],
        video_allowed_content_types: vec!["video/mp4".into(), "video/quicktime".into()],
        sweep_enabled: false,
        sweep_interval_secs: 300,
        sweep_max_dwell_secs: 6 * 60 * 60,
    }
}

//! Configuration module
//!
//! This module provides the environment-backed configuration for the API
//! service: database, storage, pipeline, callback security, upload
//! policies, and the stalled-asset sweeper.

use std::env;

use crate::storage_types::StorageBackend;
use crate::validation::UploadPolicy;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const UPLOAD_URL_TTL_SECS: u64 = 900;
const PIPELINE_TIMEOUT_SECS: u64 = 10;
const SWEEP_INTERVAL_SECS: u64 = 300;
const SWEEP_MAX_DWELL_SECS: i64 = 6 * 60 * 60;
const MAX_IMAGE_SIZE_MB: i64 = 25;
const MAX_VIDEO_SIZE_MB: i64 = 2048;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers
    pub upload_url_ttl_secs: u64,
    // Pipeline callback security
    pub callback_secret: String,
    // Processing pipeline
    pub pipeline_url: String,
    pub pipeline_api_key: Option<String>,
    pub pipeline_timeout_secs: u64,
    // Upload policies
    pub max_image_size_bytes: i64,
    pub image_allowed_extensions: Vec<String>,
    pub image_allowed_content_types: Vec<String>,
    pub max_video_size_bytes: i64,
    pub video_allowed_extensions: Vec<String>,
    pub video_allowed_content_types: Vec<String>,
    // Stalled-asset sweeper
    pub sweep_enabled: bool,
    pub sweep_interval_secs: u64,
    pub sweep_max_dwell_secs: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .parse::<StorageBackend>()
            .map_err(|e| anyhow::anyhow!(e))?;

        let max_image_size_mb = env::var("MAX_IMAGE_SIZE_MB")
            .unwrap_or_else(|_| MAX_IMAGE_SIZE_MB.to_string())
            .parse::<i64>()
            .unwrap_or(MAX_IMAGE_SIZE_MB);

        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
            .parse::<i64>()
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        let image_allowed_extensions = env::var("IMAGE_ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| "jpg,jpeg,png,gif,webp".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let image_allowed_content_types = env::var("IMAGE_ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| "image/jpeg,image/png,image/gif,image/webp".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let video_allowed_extensions = env::var("VIDEO_ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| "mp4,mov,webm,mkv".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let video_allowed_content_types = env::var("VIDEO_ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| {
                "video/mp4,video/quicktime,video/webm,video/x-matroska".to_string()
            })
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            upload_url_ttl_secs: env::var("UPLOAD_URL_TTL_SECS")
                .unwrap_or_else(|_| UPLOAD_URL_TTL_SECS.to_string())
                .parse()
                .unwrap_or(UPLOAD_URL_TTL_SECS),
            callback_secret: env::var("CALLBACK_SECRET").map_err(|_| {
                anyhow::anyhow!("CALLBACK_SECRET must be set to authenticate pipeline callbacks")
            })?,
            pipeline_url: env::var("PIPELINE_URL")
                .map_err(|_| anyhow::anyhow!("PIPELINE_URL must be set"))?,
            pipeline_api_key: env::var("PIPELINE_API_KEY").ok(),
            pipeline_timeout_secs: env::var("PIPELINE_TIMEOUT_SECS")
                .unwrap_or_else(|_| PIPELINE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(PIPELINE_TIMEOUT_SECS),
            max_image_size_bytes: max_image_size_mb * 1024 * 1024,
            image_allowed_extensions,
            image_allowed_content_types,
            max_video_size_bytes: max_video_size_mb * 1024 * 1024,
            video_allowed_extensions,
            video_allowed_content_types,
            sweep_enabled: env::var("SWEEP_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| SWEEP_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(SWEEP_INTERVAL_SECS),
            sweep_max_dwell_secs: env::var("SWEEP_MAX_DWELL_SECS")
                .unwrap_or_else(|_| SWEEP_MAX_DWELL_SECS.to_string())
                .parse()
                .unwrap_or(SWEEP_MAX_DWELL_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() {
            if self.cors_origins.iter().any(|o| o == "*") {
                return Err(anyhow::anyhow!(
                    "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
                ));
            }
            if self.storage_backend == StorageBackend::Memory {
                return Err(anyhow::anyhow!(
                    "STORAGE_BACKEND=memory is not usable in production"
                ));
            }
            if self.callback_secret.len() < 16 {
                return Err(anyhow::anyhow!(
                    "CALLBACK_SECRET must be at least 16 characters in production"
                ));
            }
        }

        if self.storage_backend == StorageBackend::S3
            && (self.s3_bucket.is_none() || self.s3_region.is_none())
        {
            return Err(anyhow::anyhow!(
                "S3_BUCKET and S3_REGION must be set when STORAGE_BACKEND=s3"
            ));
        }

        if self.callback_secret.trim().is_empty() {
            return Err(anyhow::anyhow!("CALLBACK_SECRET cannot be empty"));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn image_policy(&self) -> UploadPolicy {
        UploadPolicy::new(
            self.max_image_size_bytes,
            self.image_allowed_extensions.clone(),
            self.image_allowed_content_types.clone(),
        )
    }

    pub fn video_policy(&self) -> UploadPolicy {
        UploadPolicy::new(
            self.max_video_size_bytes,
            self.video_allowed_extensions.clone(),
            self.video_allowed_content_types.clone(),
        )
    }
}

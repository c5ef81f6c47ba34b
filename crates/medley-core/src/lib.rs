//! Medley Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! validation shared across all Medley components.
//!
//! The asset state machine lives in [`models::AssetStatus`] and
//! [`models::AssetChange`]; everything that mutates an asset goes through a
//! store's `transition` with one of the change constructors defined there.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
pub use validation::{UploadPolicy, UploadValidationError};

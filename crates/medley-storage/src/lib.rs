//! Medley Storage Library
//!
//! This crate provides the blob storage abstraction for Medley. Clients never
//! upload through the API server; they receive presigned PUT URLs and talk to
//! the backend directly. The API only checks existence, builds public URLs,
//! and deletes asset prefixes.
//!
//! # Storage key format
//!
//! Source uploads land under a per-asset prefix:
//!
//! - **Videos**: `media/videos/{public_id}/original.{ext}`
//! - **Images**: `media/images/{public_id}/original.{ext}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized
//! in the `keys` module so every caller stays consistent.

pub mod factory;
pub mod keys;
pub mod memory;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_blob_store;
pub use keys::{asset_prefix, image_source_key, video_source_key};
pub use medley_core::StorageBackend;
pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;
pub use traits::{BlobStore, StorageError, StorageResult};

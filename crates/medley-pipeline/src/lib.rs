//! Medley Pipeline Library
//!
//! This crate provides the client side of the processing pipeline: the
//! JobPipeline trait for submitting transcode/derivative jobs, the HTTP
//! implementation used in production, and a fake used by tests.
//!
//! The pipeline reports results back asynchronously through the callback
//! endpoints; nothing in this crate waits for a job to finish.

pub mod fake;
pub mod http;
pub mod traits;

// Re-export commonly used types
pub use fake::FakeJobPipeline;
pub use http::HttpJobPipeline;
pub use traits::{JobPipeline, PipelineError, PipelineResult, ProcessingJob};

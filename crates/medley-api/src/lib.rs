//! Medley API Library
//!
//! HTTP surface for the media upload lifecycle: upload grants, upload
//! confirmation, pipeline callbacks, status queries, and media management,
//! plus the application setup shared by the binary and the integration
//! tests.

// Module declarations
mod api_doc;
pub mod constants;
mod handlers;
pub mod services;
pub mod setup;
pub mod sweep;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError, ValidatedJson};
pub use state::AppState;

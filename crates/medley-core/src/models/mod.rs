//! Data models for the application
//!
//! This module contains all data structures used throughout the application,
//! organized by domain. Each sub-module represents a specific feature area.

mod asset;
mod callback;
mod upload;

// Re-export all models for convenient imports
pub use asset::*;
pub use callback::*;
pub use upload::*;

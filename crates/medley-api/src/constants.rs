//! API-wide constants.

/// Prefix for all versioned API routes.
pub const API_PREFIX: &str = "/api/v0";

/// Maximum accepted JSON request body, in bytes. Uploads never pass
/// through this service, so bodies stay small.
pub const MAX_JSON_BODY_BYTES: usize = 256 * 1024;

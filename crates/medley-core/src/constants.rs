//! Shared constants

/// Error message stored on an asset when the processing pipeline refuses or
/// fails to accept a job submission. Also returned as the client message of
/// the failing confirm call.
pub const DISPATCH_FAILED_MESSAGE: &str = "failed to queue processing";

/// Error message stored on an asset that sat in a non-terminal status past
/// the configured dwell and was expired by the sweeper.
pub const SWEEP_TIMEOUT_MESSAGE: &str = "processing timed out";

/// Fallback message for error callbacks that carry no detail of their own.
pub const PROCESSING_FAILED_MESSAGE: &str = "processing failed";

/// Header carrying the shared secret on pipeline callback requests.
pub const CALLBACK_SECRET_HEADER: &str = "x-callback-secret";

//! Domain services behind the HTTP handlers.
//!
//! Each service owns the capability handles it needs and is cloned into
//! `AppState`. Handlers stay thin: extract, delegate, serialize.

pub mod dispatch;
pub mod grants;
pub mod ingest;
pub mod lifecycle;
pub mod status;

pub use dispatch::DispatchService;
pub use grants::GrantService;
pub use ingest::IngestService;
pub use lifecycle::MediaLifecycleService;
pub use status::StatusQueryService;

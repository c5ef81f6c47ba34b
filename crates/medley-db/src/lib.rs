//! Medley database layer
//!
//! [`AssetStore`] is the only seam through which asset state is read or
//! mutated. Two adapters implement it: [`PgAssetStore`] for production and
//! [`MemoryAssetStore`] for tests and local runs. Both funnel every write
//! through the same monotonic transition check, so out-of-order callbacks
//! are absorbed identically regardless of backend.

mod memory;
mod postgres;
mod store;

pub use memory::MemoryAssetStore;
pub use postgres::PgAssetStore;
pub use store::{AssetStore, ExpectedStatus, StoreError, StoreResult, Transitioned};

//! Shared key generation for storage backends.
//!
//! Key format: `media/videos/{public_id}/original.{ext}` for video sources,
//! `media/images/{public_id}/original.{ext}` for image sources. Derived
//! outputs produced by the pipeline live under the same per-asset prefix.

use medley_core::models::AssetKind;
use uuid::Uuid;

/// Generate the storage key for a raw video upload.
pub fn video_source_key(public_id: Uuid, extension: &str) -> String {
    format!("media/videos/{}/original.{}", public_id, extension)
}

/// Generate the storage key for a raw image upload.
pub fn image_source_key(public_id: Uuid, extension: &str) -> String {
    format!("media/images/{}/original.{}", public_id, extension)
}

/// The prefix holding every object belonging to one asset, source and
/// derived outputs alike. Used for cascade deletes.
pub fn asset_prefix(kind: AssetKind, public_id: Uuid) -> String {
    match kind {
        AssetKind::Video => format!("media/videos/{}", public_id),
        AssetKind::Image => format!("media/images/{}", public_id),
    }
}

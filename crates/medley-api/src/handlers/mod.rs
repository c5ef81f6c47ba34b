//! HTTP handlers, grouped by resource.

pub mod callbacks;
pub mod image_upload;
pub mod media;
pub mod video_upload;

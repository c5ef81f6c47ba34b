//! Domain route groups (videos, images, callbacks, media).

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;

fn path(suffix: &str) -> String {
    format!("{}{}", API_PREFIX, suffix)
}

pub fn video_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &path("/videos/uploads"),
            post(handlers::video_upload::grant_video_upload),
        )
        .route(
            &path("/videos/uploads/confirm"),
            post(handlers::video_upload::confirm_video_upload),
        )
        .route(
            &path("/videos/{correlation_id}/status"),
            get(handlers::media::get_video_status),
        )
}

pub fn image_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &path("/images/uploads"),
            post(handlers::image_upload::grant_image_upload),
        )
        .route(
            &path("/images/uploads/confirm"),
            post(handlers::image_upload::confirm_image_upload),
        )
        .route(
            &path("/images/{correlation_id}/status"),
            get(handlers::media::get_image_status),
        )
}

pub fn callback_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &path("/callbacks/video"),
            post(handlers::callbacks::video_callback),
        )
        .route(
            &path("/callbacks/image"),
            post(handlers::callbacks::image_callback),
        )
}

pub fn media_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(&path("/media"), get(handlers::media::list_post_media))
        .route(&path("/media/{media_id}"), delete(handlers::media::delete_media))
}

//! Route configuration and setup.
//!
//! Domain route groups live in [domains](domains); health checks in [health](health).

mod domains;
mod health;

use crate::api_doc;
use crate::constants::MAX_JSON_BODY_BYTES;
use crate::state::AppState;
use anyhow::Context;
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use medley_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let app = Router::new()
        .merge(domains::video_routes())
        .merge(domains::image_routes())
        .merge(domains::callback_routes())
        .merge(domains::media_routes())
        .merge(health::routes())
        .route(
            "/api/openapi.json",
            get(|| async { Json(api_doc::get_openapi_spec()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(RequestBodyLimitLayer::new(MAX_JSON_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin: {}", origin))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

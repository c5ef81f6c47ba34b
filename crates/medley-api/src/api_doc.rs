//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use medley_core::models;

/// Returns the OpenAPI spec served at /api/openapi.json.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Medley API",
        version = "0.1.0",
        description = "Media upload orchestration API (v0). Clients upload blobs directly to storage via presigned URLs, confirm the upload to queue processing, and poll asset status while the processing pipeline reports back over signed callbacks. All endpoints are versioned under /api/v0/."
    ),
    paths(
        // Videos
        handlers::video_upload::grant_video_upload,
        handlers::video_upload::confirm_video_upload,
        handlers::media::get_video_status,
        // Images
        handlers::image_upload::grant_image_upload,
        handlers::image_upload::confirm_image_upload,
        handlers::media::get_image_status,
        // Pipeline callbacks
        handlers::callbacks::video_callback,
        handlers::callbacks::image_callback,
        // Media (unified operations)
        handlers::media::list_post_media,
        handlers::media::delete_media,
    ),
    components(
        schemas(
            // Upload models
            models::UploadGrantRequest,
            models::UploadGrantResponse,
            models::ConfirmVideoRequest,
            models::ConfirmImageRequest,
            models::ConfirmResponse,
            // Status models
            models::AssetStatusResponse,
            models::MediaItemResponse,
            models::AssetKind,
            models::AssetStatus,
            models::OutputSet,
            models::VideoOutputs,
            models::ImageOutputs,
            models::ImageVariants,
            // Callback models
            models::VideoCallback,
            models::ImageCallback,
            models::VideoCallbackStatus,
            models::ImageCallbackStatus,
            models::CallbackAck,
            // Query params
            handlers::media::PostMediaQuery,
            // Error
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "videos", description = "Video upload grants, confirmation, and status"),
        (name = "images", description = "Image upload grants, confirmation, and status"),
        (name = "callbacks", description = "Signed callbacks from the processing pipeline"),
        (name = "media", description = "Unified media operations (post listing, delete)")
    )
)]
pub struct ApiDoc;

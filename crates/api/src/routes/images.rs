//! Route definitions for image generation and job status.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

/// Routes for the generation workflow.
///
/// ```text
/// POST   /generate-image          -> generate_image
/// GET    /image-status/{id}       -> image_status
/// DELETE /image-status/{id}       -> cancel_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-image", post(images::generate_image))
        .route(
            "/image-status/{id}",
            get(images::image_status).delete(images::cancel_image),
        )
}

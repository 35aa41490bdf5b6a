pub mod chat;
pub mod health;
pub mod history;
pub mod images;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /generate-image            submit a generation (sync or async mode)
/// /image-status/{id}         poll (GET) or cancel (DELETE) a job
/// /chat                      single-shot chat relay
/// /history                   recent completed generations
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(images::router())
        .merge(chat::router())
        .merge(history::router())
}

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use genrelay_api::config::ServerConfig;
use genrelay_api::jobs::JobRegistry;
use genrelay_api::router::build_app_router;
use genrelay_api::state::AppState;
use genrelay_chat::{ChatClient, ChatConfig};
use genrelay_horde::api::HordeApi;
use genrelay_horde::config::HordeConfig;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
    }
}

/// Build an `AppState` whose provider clients point at a closed local
/// port, so an accidental upstream call fails fast instead of reaching
/// the network, and whose poll budget is tiny.
pub fn build_test_state(pool: SqlitePool) -> AppState {
    let horde_config = HordeConfig {
        api_url: "http://127.0.0.1:9".to_string(),
        submit_timeout: Duration::from_millis(250),
        status_timeout: Duration::from_millis(250),
        poll_interval: Duration::from_millis(10),
        max_poll_attempts: 2,
        ..HordeConfig::default()
    };
    let chat_config = ChatConfig {
        api_url: "http://127.0.0.1:9".to_string(),
        request_timeout: Duration::from_millis(250),
        ..ChatConfig::default()
    };

    AppState {
        pool,
        config: Arc::new(test_config()),
        horde: Arc::new(HordeApi::new(horde_config)),
        chat: Arc::new(ChatClient::new(chat_config)),
        registry: Arc::new(JobRegistry::new()),
        shutdown: CancellationToken::new(),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This goes through [`build_app_router`] so integration tests exercise
/// the same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery) that production uses.
pub fn build_test_app(pool: SqlitePool) -> Router {
    let (app, _state) = build_test_app_with_state(pool);
    app
}

/// Like [`build_test_app`], but also hands back the state so tests can
/// drive the job registry directly.
pub fn build_test_app_with_state(pool: SqlitePool) -> (Router, AppState) {
    let state = build_test_state(pool);
    let app = build_app_router(state.clone(), &test_config());
    (app, state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Issue a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a POST request with a JSON body against the app.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a DELETE request against the app.
pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

//! Integration tests for the image generation endpoints: request
//! validation, job status reads, idempotence after completion, and
//! cancellation.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json};
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use genrelay_core::job::ResultPayload;

// ---------------------------------------------------------------------------
// Validation: rejected before any upstream call
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_prompt_is_rejected(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/generate-image", json!({ "prompt": "" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn whitespace_prompt_is_rejected(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/generate-image", json!({ "prompt": "   " })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_REQUEST");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_multiple_of_64_width_is_rejected(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/generate-image",
        json!({ "prompt": "a red bicycle", "width": 500 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(
        json["error"].as_str().unwrap().contains("width"),
        "error should name the offending field: {json}"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_sampler_is_rejected(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/generate-image",
        json!({ "prompt": "a red bicycle", "sampler": "warp_drive" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Asynchronous mode: submission shape
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn async_submission_returns_202_with_check_url(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/generate-image",
        json!({ "prompt": "a red bicycle" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let json = body_json(response).await;
    assert_eq!(json["status"], "submitted");

    let image_id = json["imageId"].as_str().expect("imageId should be set");
    let image_id: Uuid = image_id.parse().expect("imageId should be a UUID");

    let check_url = json["checkUrl"].as_str().expect("checkUrl should be set");
    assert_eq!(check_url, format!("/api/v1/image-status/{image_id}"));
}

// ---------------------------------------------------------------------------
// Status endpoint
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn status_of_unknown_job_is_404(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/image-status/{}", Uuid::new_v4())).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn status_with_malformed_id_is_400(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/image-status/not-a-uuid").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn status_of_processing_job_reports_queue_info(pool: SqlitePool) {
    let (app, state) = common::build_test_app_with_state(pool);

    let (image_id, _cancel) = state.registry.register(&state.shutdown);
    state.registry.mark_processing(&image_id, 3, 40);

    let response = get(app, &format!("/api/v1/image-status/{image_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "processing");
    assert_eq!(json["queuePosition"], 3);
    assert_eq!(json["waitTime"], 40);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn completed_status_is_idempotent(pool: SqlitePool) {
    let (app, state) = common::build_test_app_with_state(pool);

    let (image_id, _cancel) = state.registry.register(&state.shutdown);
    state.registry.complete(
        &image_id,
        ResultPayload {
            image_url: "https://x/1.png".to_string(),
            model_used: "stable_diffusion".to_string(),
        },
    );

    let uri = format!("/api/v1/image-status/{image_id}");
    let first = body_json(get(app.clone(), &uri).await).await;
    let second = body_json(get(app, &uri).await).await;

    assert_eq!(first["status"], "completed");
    assert_eq!(first["imageUrl"], "https://x/1.png");
    assert_eq!(first["model"], "stable_diffusion");
    // Checking twice after completion must return the same result.
    assert_eq!(first, second);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_status_surfaces_the_reason(pool: SqlitePool) {
    let (app, state) = common::build_test_app_with_state(pool);

    let (image_id, _cancel) = state.registry.register(&state.shutdown);
    state
        .registry
        .fail(&image_id, "Generation failed: NSFW filter triggered");

    let response = get(app, &format!("/api/v1/image-status/{image_id}")).await;
    let json = body_json(response).await;

    assert_eq!(json["status"], "failed");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("NSFW filter triggered"));
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn cancel_in_flight_job_returns_204_then_conflict(pool: SqlitePool) {
    let (app, state) = common::build_test_app_with_state(pool);

    let (image_id, cancel) = state.registry.register(&state.shutdown);
    state.registry.mark_processing(&image_id, 1, 10);

    let uri = format!("/api/v1/image-status/{image_id}");

    let response = delete(app.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(cancel.is_cancelled(), "poller token must be triggered");

    // A second cancel is a conflict -- the job is already terminal.
    let response = delete(app.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // And the status endpoint reports the job as failed.
    let json = body_json(get(app, &uri).await).await;
    assert_eq!(json["status"], "failed");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cancel_unknown_job_is_404(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = delete(app, &format!("/api/v1/image-status/{}", Uuid::new_v4())).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

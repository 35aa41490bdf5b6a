//! Integration tests for the generation-history endpoint.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};
use sqlx::SqlitePool;

use genrelay_core::generation::GenerationRequest;
use genrelay_core::job::ResultPayload;
use genrelay_db::models::history::NewGenerationRecord;
use genrelay_db::repositories::GenerationHistoryRepo;

async fn seed(pool: &SqlitePool, job_id: &str, prompt: &str) {
    let request = GenerationRequest::new(prompt);
    let result = ResultPayload {
        image_url: format!("https://x/{job_id}.png"),
        model_used: "stable_diffusion".to_string(),
    };
    GenerationHistoryRepo::insert(pool, &NewGenerationRecord::from_result(job_id, &request, &result))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_history_returns_empty_data(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/history").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"], serde_json::json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn history_lists_newest_first_with_limit(pool: SqlitePool) {
    seed(&pool, "job-1", "first").await;
    seed(&pool, "job-2", "second").await;
    seed(&pool, "job-3", "third").await;

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/history?limit=2").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["jobId"], "job-3");
    assert_eq!(data[1]["jobId"], "job-2");
    assert_eq!(data[0]["imageUrl"], "https://x/job-3.png");
}

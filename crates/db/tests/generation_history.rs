//! Integration tests for the generation-history repository.

use sqlx::SqlitePool;

use genrelay_core::generation::GenerationRequest;
use genrelay_core::job::ResultPayload;
use genrelay_db::models::history::NewGenerationRecord;
use genrelay_db::repositories::GenerationHistoryRepo;

fn sample_record(job_id: &str, prompt: &str) -> NewGenerationRecord {
    let request = GenerationRequest::new(prompt);
    let result = ResultPayload {
        image_url: format!("https://x/{job_id}.png"),
        model_used: "stable_diffusion".to_string(),
    };
    NewGenerationRecord::from_result(job_id, &request, &result)
}

#[sqlx::test]
async fn insert_returns_the_stored_row(pool: SqlitePool) {
    let record = GenerationHistoryRepo::insert(&pool, &sample_record("job-1", "a red bicycle"))
        .await
        .unwrap();

    assert_eq!(record.job_id, "job-1");
    assert_eq!(record.prompt, "a red bicycle");
    assert_eq!(record.image_url, "https://x/job-1.png");
    assert_eq!(record.model, "stable_diffusion");
    assert_eq!(record.width, 512);
    assert!(record.id > 0);
}

#[sqlx::test]
async fn find_by_job_id_round_trips(pool: SqlitePool) {
    GenerationHistoryRepo::insert(&pool, &sample_record("job-2", "a lighthouse"))
        .await
        .unwrap();

    let found = GenerationHistoryRepo::find_by_job_id(&pool, "job-2")
        .await
        .unwrap()
        .expect("row should exist");
    assert_eq!(found.prompt, "a lighthouse");

    let missing = GenerationHistoryRepo::find_by_job_id(&pool, "nope")
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test]
async fn list_recent_is_newest_first_and_bounded(pool: SqlitePool) {
    for i in 0..5 {
        GenerationHistoryRepo::insert(&pool, &sample_record(&format!("job-{i}"), "p"))
            .await
            .unwrap();
    }

    let recent = GenerationHistoryRepo::list_recent(&pool, 3).await.unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].job_id, "job-4");
    assert_eq!(recent[2].job_id, "job-2");

    assert_eq!(GenerationHistoryRepo::count(&pool).await.unwrap(), 5);
}

#[sqlx::test]
async fn duplicate_job_id_is_rejected(pool: SqlitePool) {
    GenerationHistoryRepo::insert(&pool, &sample_record("job-dup", "first"))
        .await
        .unwrap();

    let result = GenerationHistoryRepo::insert(&pool, &sample_record("job-dup", "second")).await;
    assert!(result.is_err());
}

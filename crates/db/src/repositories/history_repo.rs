//! Repository for the `generation_history` table.

use crate::models::history::{GenerationRecord, NewGenerationRecord};
use crate::DbPool;

/// Column list for `generation_history` queries.
const COLUMNS: &str = "\
    id, job_id, prompt, negative_prompt, image_url, model, \
    width, height, steps, sampler, cfg_scale, created_at";

/// Provides query operations for completed-generation history.
pub struct GenerationHistoryRepo;

impl GenerationHistoryRepo {
    /// Insert a completed generation, returning the inserted row.
    pub async fn insert(
        pool: &DbPool,
        record: &NewGenerationRecord,
    ) -> Result<GenerationRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO generation_history \
             (job_id, prompt, negative_prompt, image_url, model, \
              width, height, steps, sampler, cfg_scale) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationRecord>(&query)
            .bind(&record.job_id)
            .bind(&record.prompt)
            .bind(&record.negative_prompt)
            .bind(&record.image_url)
            .bind(&record.model)
            .bind(record.width)
            .bind(record.height)
            .bind(record.steps)
            .bind(&record.sampler)
            .bind(record.cfg_scale)
            .fetch_one(pool)
            .await
    }

    /// Find a recorded generation by its provider job id.
    pub async fn find_by_job_id(
        pool: &DbPool,
        job_id: &str,
    ) -> Result<Option<GenerationRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generation_history WHERE job_id = ?");
        sqlx::query_as::<_, GenerationRecord>(&query)
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }

    /// List the most recent completed generations, newest first.
    pub async fn list_recent(
        pool: &DbPool,
        limit: i64,
    ) -> Result<Vec<GenerationRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generation_history \
             ORDER BY id DESC LIMIT ?"
        );
        sqlx::query_as::<_, GenerationRecord>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Total number of recorded generations.
    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM generation_history")
            .fetch_one(pool)
            .await
    }
}

//! Generation history models.
//!
//! Row struct for the `generation_history` table plus the insert DTO built
//! from a resolved job.

use serde::Serialize;
use sqlx::FromRow;

use genrelay_core::generation::GenerationRequest;
use genrelay_core::job::ResultPayload;
use genrelay_core::types::Timestamp;

/// A completed generation row from the `generation_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub id: i64,
    pub job_id: String,
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub image_url: String,
    pub model: String,
    pub width: i64,
    pub height: i64,
    pub steps: i64,
    pub sampler: String,
    pub cfg_scale: f64,
    pub created_at: Timestamp,
}

/// Input for recording a completed generation.
#[derive(Debug, Clone)]
pub struct NewGenerationRecord {
    pub job_id: String,
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub image_url: String,
    pub model: String,
    pub width: i64,
    pub height: i64,
    pub steps: i64,
    pub sampler: String,
    pub cfg_scale: f64,
}

impl NewGenerationRecord {
    /// Assemble an insert DTO from the request that produced a result.
    pub fn from_result(
        job_id: impl Into<String>,
        request: &GenerationRequest,
        result: &ResultPayload,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            prompt: request.prompt.clone(),
            negative_prompt: request.negative_prompt.clone(),
            image_url: result.image_url.clone(),
            model: result.model_used.clone(),
            width: i64::from(request.width),
            height: i64::from(request.height),
            steps: i64::from(request.steps),
            sampler: request.sampler_name.clone(),
            cfg_scale: request.cfg_scale,
        }
    }
}

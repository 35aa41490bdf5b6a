//! Handlers for image generation and job status.
//!
//! `POST /generate-image` supports two integration modes. With
//! `wait: true` the handler submits and polls inside the request and
//! answers with the finished image. Without it the job is registered in
//! the [`JobRegistry`](crate::jobs::JobRegistry), a polling task is
//! spawned, and the caller follows `checkUrl` until the job resolves.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use genrelay_core::error::RelayError;
use genrelay_core::generation::{
    GenerationRequest, DEFAULT_CFG_SCALE, DEFAULT_HEIGHT, DEFAULT_MODEL, DEFAULT_SAMPLER,
    DEFAULT_STEPS, DEFAULT_WIDTH,
};
use genrelay_core::job::{JobStatus, ResultPayload};
use genrelay_db::models::history::NewGenerationRecord;
use genrelay_db::repositories::GenerationHistoryRepo;
use genrelay_horde::poll::{poll_until_terminal, PollConfig, PollOutcome};
use genrelay_horde::submit::submit_with_fallback;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::jobs::{CancelOutcome, JobState};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// `POST /api/v1/generate-image` request body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    #[validate(length(min = 1, max = 1500))]
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Shorthand for a square width/height.
    pub image_size: Option<u32>,
    pub steps: Option<u32>,
    pub sampler: Option<String>,
    pub cfg_scale: Option<f64>,
    /// Ordered model candidates, tried one at a time until one is accepted.
    pub models: Option<Vec<String>>,
    /// `true` waits for the result inside this request; otherwise the job
    /// is registered and the caller polls the status endpoint.
    #[serde(default)]
    pub wait: bool,
}

impl GenerateImageRequest {
    /// Apply defaults and produce a validated domain request.
    fn into_generation_request(self) -> Result<GenerationRequest, RelayError> {
        let width = self.width.or(self.image_size).unwrap_or(DEFAULT_WIDTH);
        let height = self.height.or(self.image_size).unwrap_or(DEFAULT_HEIGHT);

        let model_groups = match self.models {
            Some(models) if !models.is_empty() => {
                models.into_iter().map(|model| vec![model]).collect()
            }
            _ => vec![vec![DEFAULT_MODEL.to_string()]],
        };

        let request = GenerationRequest {
            prompt: self.prompt,
            negative_prompt: self.negative_prompt,
            width,
            height,
            steps: self.steps.unwrap_or(DEFAULT_STEPS),
            sampler_name: self.sampler.unwrap_or_else(|| DEFAULT_SAMPLER.to_string()),
            cfg_scale: self.cfg_scale.unwrap_or(DEFAULT_CFG_SCALE),
            model_groups,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Synchronous-mode success response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub image_url: String,
    pub model: String,
}

/// Asynchronous-mode acceptance response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedResponse {
    pub status: &'static str,
    pub image_id: Uuid,
    pub check_url: String,
}

/// `GET /api/v1/image-status/{id}` response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<JobState> for ImageStatusResponse {
    fn from(state: JobState) -> Self {
        let empty = Self {
            status: "processing",
            image_url: None,
            model: None,
            wait_time: None,
            queue_position: None,
            error: None,
        };
        match state {
            JobState::Submitting => empty,
            JobState::Processing {
                queue_position,
                wait_time_secs,
            } => Self {
                wait_time: Some(wait_time_secs),
                queue_position: Some(queue_position),
                ..empty
            },
            JobState::Completed { image_url, model } => Self {
                status: "completed",
                image_url: Some(image_url),
                model: Some(model),
                ..empty
            },
            JobState::Failed { message } => Self {
                status: "failed",
                error: Some(message),
                ..empty
            },
            JobState::Cancelled => Self {
                status: "failed",
                error: Some("Job was cancelled".to_string()),
                ..empty
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Generate
// ---------------------------------------------------------------------------

/// POST /api/v1/generate-image
///
/// Validates the request, then either waits for the result (`wait: true`)
/// or registers a client-pollable job and returns 202 immediately.
pub async fn generate_image(
    State(state): State<AppState>,
    Json(body): Json<GenerateImageRequest>,
) -> AppResult<Response> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let wait = body.wait;
    let request = body.into_generation_request()?;

    if wait {
        let response = generate_and_wait(state, request).await?;
        Ok(response.into_response())
    } else {
        Ok(submit_for_polling(state, request).into_response())
    }
}

/// Synchronous mode: submit, poll to a terminal state, answer with the
/// image.
async fn generate_and_wait(
    state: AppState,
    request: GenerationRequest,
) -> AppResult<Json<ImageResponse>> {
    // Dropping the guard (client disconnect, timeout layer) cancels the
    // in-flight poll instead of leaving it running to the budget.
    let cancel = state.shutdown.child_token();
    let _guard = cancel.clone().drop_guard();

    let job = submit_with_fallback(&state.horde, &request).await?;
    let poll_config = PollConfig::from(state.horde.config());

    let outcome =
        poll_until_terminal(&*state.horde, &job.handle, &poll_config, &cancel, |_, _| {}).await;
    let payload = outcome.into_result()?;

    record_history(&state, &job.handle.id, &request, &payload).await;

    Ok(Json(ImageResponse {
        image_url: payload.image_url,
        model: payload.model_used,
    }))
}

/// Asynchronous mode: register the job and hand the work to a spawned
/// polling task.
fn submit_for_polling(
    state: AppState,
    request: GenerationRequest,
) -> (StatusCode, Json<SubmittedResponse>) {
    let (image_id, cancel) = state.registry.register(&state.shutdown);
    let check_url = format!("/api/v1/image-status/{image_id}");

    tracing::info!(%image_id, "Image job registered");
    tokio::spawn(run_generation_job(state.clone(), image_id, request, cancel));

    (
        StatusCode::ACCEPTED,
        Json(SubmittedResponse {
            status: "submitted",
            image_id,
            check_url,
        }),
    )
}

/// Drive one registered job from submission to its terminal registry state.
async fn run_generation_job(
    state: AppState,
    image_id: Uuid,
    request: GenerationRequest,
    cancel: CancellationToken,
) {
    let job = match submit_with_fallback(&state.horde, &request).await {
        Ok(job) => job,
        Err(error) => {
            tracing::warn!(%image_id, error = %error, "Submission failed");
            state.registry.fail(&image_id, error.to_string());
            return;
        }
    };

    state.registry.mark_processing(&image_id, 0, 0);

    let poll_config = PollConfig::from(state.horde.config());
    let outcome = poll_until_terminal(
        &*state.horde,
        &job.handle,
        &poll_config,
        &cancel,
        |_, status| {
            if let JobStatus::Pending {
                queue_position,
                wait_time_secs,
            } = status
            {
                state
                    .registry
                    .mark_processing(&image_id, *queue_position, *wait_time_secs);
            }
        },
    )
    .await;

    match outcome {
        PollOutcome::Done(payload) => {
            record_history(&state, &job.handle.id, &request, &payload).await;
            state.registry.complete(&image_id, payload);
        }
        PollOutcome::Faulted { reason } => {
            state.registry.fail(&image_id, format!("Generation failed: {reason}"));
        }
        PollOutcome::TimedOut { attempts } => {
            state.registry.fail(
                &image_id,
                format!("Generation timed out after {attempts} status checks; resubmit to try again"),
            );
        }
        // The registry entry was already marked when the token fired
        // (client cancel) or the process is shutting down.
        PollOutcome::Cancelled => {
            tracing::debug!(%image_id, "Polling task cancelled");
        }
    }
}

/// Record a completed generation, logging instead of failing the request.
async fn record_history(
    state: &AppState,
    job_id: &str,
    request: &GenerationRequest,
    payload: &ResultPayload,
) {
    let record = NewGenerationRecord::from_result(job_id, request, payload);
    if let Err(error) = GenerationHistoryRepo::insert(&state.pool, &record).await {
        tracing::warn!(job_id, error = %error, "Failed to record generation history");
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /api/v1/image-status/{id}
///
/// Reads the tracked state; a finished job answers identically on every
/// call and is never restarted.
pub async fn image_status(
    State(state): State<AppState>,
    Path(image_id): Path<Uuid>,
) -> AppResult<Json<ImageStatusResponse>> {
    let job = state
        .registry
        .get(&image_id)
        .ok_or_else(|| AppError::NotFound(format!("No job with id {image_id}")))?;

    Ok(Json(ImageStatusResponse::from(job)))
}

// ---------------------------------------------------------------------------
// Cancel
// ---------------------------------------------------------------------------

/// DELETE /api/v1/image-status/{id}
///
/// Cancel an in-flight job. Returns 204 on success, 409 if the job already
/// reached a terminal state.
pub async fn cancel_image(
    State(state): State<AppState>,
    Path(image_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    match state.registry.cancel(&image_id) {
        CancelOutcome::Cancelled => {
            tracing::info!(%image_id, "Job cancelled by client");
            Ok(StatusCode::NO_CONTENT)
        }
        CancelOutcome::AlreadyTerminal => {
            Err(AppError::Conflict("Job already finished".to_string()))
        }
        CancelOutcome::NotFound => Err(AppError::NotFound(format!("No job with id {image_id}"))),
    }
}

//! Job submission with ordered model-group fallback.
//!
//! Each group gets exactly one submission call. A soft failure (no worker
//! capacity) advances to the next group without surfacing an error; a hard
//! failure aborts the chain immediately. The soft/hard distinction lives in
//! one place -- [`classify_submit_response`] / [`classify_submit_error`] --
//! so every caller applies the same policy.

use std::future::Future;

use genrelay_core::error::RelayError;
use genrelay_core::generation::{GenerationRequest, ModelGroup};
use genrelay_core::job::{JobHandle, SubmittedJob};

use crate::api::{HordeApi, HordeApiError, SubmitResponse};
use crate::payload::build_submit_payload;

/// Warning code the provider attaches when no worker can take the job.
pub const NO_WORKER_WARNING_CODE: &str = "NoAvailableWorker";

/// Outcome of one submission attempt against a single model group.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The provider accepted the job.
    Accepted(JobHandle),
    /// No capacity for this group right now; the next group should be tried.
    Soft(String),
    /// Unrecoverable; the fallback chain must abort.
    Hard(RelayError),
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Whether a 2xx submission response carries the no-available-worker signal.
fn has_no_worker_warning(response: &SubmitResponse) -> bool {
    let message_signals = |m: &str| m.to_ascii_lowercase().contains("no available worker");

    response
        .warnings
        .iter()
        .any(|w| w.code == NO_WORKER_WARNING_CODE || message_signals(&w.message))
        || response.message.as_deref().is_some_and(message_signals)
}

/// Classify a parsed 2xx submission response.
///
/// A response is only [`AttemptOutcome::Accepted`] when it carries a job id
/// *and* no no-worker warning. A 2xx body without a job id is treated as a
/// soft failure so the remaining groups still get their chance.
pub fn classify_submit_response(response: &SubmitResponse) -> AttemptOutcome {
    if has_no_worker_warning(response) {
        return AttemptOutcome::Soft(
            response
                .message
                .clone()
                .unwrap_or_else(|| "no available worker".to_string()),
        );
    }
    match &response.id {
        Some(id) => AttemptOutcome::Accepted(JobHandle::new(id.clone())),
        None => AttemptOutcome::Soft("provider returned no job id".to_string()),
    }
}

/// Classify a failed submission call.
///
/// Only an upstream 503 is soft. 400 means the request itself is bad and
/// trying other groups cannot fix it; 429 is surfaced so the caller backs
/// off; credential rejections are a relay misconfiguration, not a caller
/// problem.
pub fn classify_submit_error(error: HordeApiError) -> AttemptOutcome {
    match error {
        HordeApiError::Api { status: 503, message } => AttemptOutcome::Soft(message),
        HordeApiError::Api { status: 400, message } => {
            AttemptOutcome::Hard(RelayError::InvalidRequest(message))
        }
        HordeApiError::Api { status: 429, message } => {
            AttemptOutcome::Hard(RelayError::RateLimited(message))
        }
        HordeApiError::Api {
            status: status @ (401 | 403),
            message,
        } => AttemptOutcome::Hard(RelayError::Internal(format!(
            "Provider rejected relay credentials ({status}): {message}"
        ))),
        HordeApiError::Api { status, message } => {
            AttemptOutcome::Hard(RelayError::Upstream(format!("{status}: {message}")))
        }
        HordeApiError::Request(e) => AttemptOutcome::Hard(RelayError::Upstream(e.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Fallback driver
// ---------------------------------------------------------------------------

/// Try each model group in order until one attempt is accepted.
///
/// `attempt` performs a single submission for one group. Soft failures
/// advance to the next group; a hard failure aborts immediately; an empty
/// or exhausted list yields [`RelayError::ServiceUnavailable`]. Groups with
/// no model names are skipped.
pub async fn try_model_groups<F, Fut>(
    groups: &[ModelGroup],
    mut attempt: F,
) -> Result<SubmittedJob, RelayError>
where
    F: FnMut(ModelGroup) -> Fut,
    Fut: Future<Output = AttemptOutcome>,
{
    for models in groups {
        if models.is_empty() {
            continue;
        }
        match attempt(models.clone()).await {
            AttemptOutcome::Accepted(handle) => {
                return Ok(SubmittedJob {
                    handle,
                    models: models.clone(),
                });
            }
            AttemptOutcome::Soft(reason) => {
                tracing::debug!(models = ?models, reason, "No capacity for model group, trying next");
            }
            AttemptOutcome::Hard(error) => return Err(error),
        }
    }

    Err(RelayError::ServiceUnavailable(
        "No available worker for any requested model group".to_string(),
    ))
}

/// Submit a request to the provider, falling back across its model groups.
///
/// Returns the accepted job handle together with the group that was
/// actually accepted.
pub async fn submit_with_fallback(
    api: &HordeApi,
    request: &GenerationRequest,
) -> Result<SubmittedJob, RelayError> {
    let job = try_model_groups(&request.model_groups, |models| async move {
        let payload = build_submit_payload(request, &models);
        match api.submit(&payload).await {
            Ok(response) => classify_submit_response(&response),
            Err(error) => classify_submit_error(error),
        }
    })
    .await?;

    tracing::info!(
        job_id = %job.handle.id,
        models = ?job.models,
        "Generation job submitted",
    );

    Ok(job)
}

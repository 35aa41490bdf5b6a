//! Status polling state machine for in-flight generation jobs.
//!
//! One logical polling loop runs per job: query status, classify, sleep,
//! repeat. The loop ends in exactly one of four ways -- the job finished,
//! the provider faulted it, the attempt budget ran out, or the caller
//! cancelled. The [`StatusSource`] seam keeps the machine independent of
//! HTTP so the transition rules are testable with a scripted source.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use genrelay_core::error::RelayError;
use genrelay_core::job::{JobHandle, JobStatus, ResultPayload};

use crate::api::{HordeApi, HordeApiError, StatusResponse};
use crate::config::HordeConfig;

// ---------------------------------------------------------------------------
// Status source seam
// ---------------------------------------------------------------------------

/// Anything that can answer "what is the status of job X?".
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn check(&self, job_id: &str) -> Result<StatusResponse, HordeApiError>;
}

#[async_trait]
impl StatusSource for HordeApi {
    async fn check(&self, job_id: &str) -> Result<StatusResponse, HordeApiError> {
        self.status(job_id).await
    }
}

// ---------------------------------------------------------------------------
// Poll configuration and outcome
// ---------------------------------------------------------------------------

/// Tunable parameters for one polling loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Fixed delay between status queries.
    pub interval: Duration,
    /// Maximum number of status queries before forcing a timeout.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 45,
        }
    }
}

impl From<&HordeConfig> for PollConfig {
    fn from(config: &HordeConfig) -> Self {
        Self {
            interval: config.poll_interval,
            max_attempts: config.max_poll_attempts,
        }
    }
}

/// Terminal outcome of a polling loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The job finished; carries the first generation's payload.
    Done(ResultPayload),
    /// The provider faulted the job.
    Faulted { reason: String },
    /// The attempt budget ran out without a terminal signal.
    TimedOut { attempts: u32 },
    /// The caller cancelled the loop.
    Cancelled,
}

impl PollOutcome {
    /// Map the outcome into the relay error taxonomy.
    ///
    /// `Cancelled` maps to [`RelayError::Internal`]; callers that cancel
    /// deliberately should match it before converting.
    pub fn into_result(self) -> Result<ResultPayload, RelayError> {
        match self {
            Self::Done(payload) => Ok(payload),
            Self::Faulted { reason } => Err(RelayError::ProviderFault(reason)),
            Self::TimedOut { attempts } => Err(RelayError::Timeout { attempts }),
            Self::Cancelled => Err(RelayError::Internal(
                "Polling was cancelled before completion".to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Transition rule
// ---------------------------------------------------------------------------

/// Derive the job status from one provider status response.
///
/// `done` with zero generations (or an empty image URL) violates the
/// provider contract and is classified as a fault rather than a success,
/// which keeps the "Done always carries a non-empty image URL" invariant.
pub fn classify_status(response: &StatusResponse) -> JobStatus {
    if response.faulted {
        return JobStatus::faulted(response.fault_message.clone().unwrap_or_default());
    }
    if response.done {
        return match response.generations.iter().find(|g| !g.img.is_empty()) {
            Some(generation) => JobStatus::Done(ResultPayload {
                image_url: generation.img.clone(),
                model_used: generation.model.clone(),
            }),
            None => JobStatus::faulted("Provider reported done without any generations"),
        };
    }
    JobStatus::Pending {
        queue_position: response.queue_position,
        wait_time_secs: response.wait_time,
    }
}

// ---------------------------------------------------------------------------
// Polling loop
// ---------------------------------------------------------------------------

/// Poll `handle` until a terminal state, the attempt budget, or cancellation.
///
/// * Exactly one status query per attempt; transport errors consume an
///   attempt and the loop stays in flight, so the budget is the sole
///   timeout authority.
/// * `on_progress` is invoked after every non-terminal attempt with the
///   attempt number and the pending status.
/// * The cancellation token is honoured both around the in-flight query and
///   during the inter-attempt sleep.
pub async fn poll_until_terminal<S, F>(
    source: &S,
    handle: &JobHandle,
    config: &PollConfig,
    cancel: &CancellationToken,
    mut on_progress: F,
) -> PollOutcome
where
    S: StatusSource + ?Sized,
    F: FnMut(u32, &JobStatus),
{
    for attempt in 1..=config.max_attempts {
        if cancel.is_cancelled() {
            tracing::debug!(job_id = %handle.id, attempt, "Polling cancelled");
            return PollOutcome::Cancelled;
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            result = source.check(&handle.id) => result,
        };

        match result {
            Ok(response) => match classify_status(&response) {
                JobStatus::Done(payload) => {
                    tracing::info!(
                        job_id = %handle.id,
                        attempt,
                        model = %payload.model_used,
                        "Generation finished",
                    );
                    return PollOutcome::Done(payload);
                }
                JobStatus::Faulted { reason } => {
                    tracing::warn!(job_id = %handle.id, attempt, reason = %reason, "Generation faulted");
                    return PollOutcome::Faulted { reason };
                }
                status @ JobStatus::Pending { .. } => {
                    on_progress(attempt, &status);
                }
            },
            Err(error) => {
                tracing::warn!(job_id = %handle.id, attempt, error = %error, "Status check failed");
            }
        }

        if attempt < config.max_attempts {
            tokio::select! {
                _ = cancel.cancelled() => return PollOutcome::Cancelled,
                _ = tokio::time::sleep(config.interval) => {}
            }
        }
    }

    tracing::warn!(
        job_id = %handle.id,
        attempts = config.max_attempts,
        "Poll budget exhausted",
    );
    PollOutcome::TimedOut {
        attempts: config.max_attempts,
    }
}

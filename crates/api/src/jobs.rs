//! In-memory registry of client-pollable generation jobs.
//!
//! Each asynchronous-mode submission gets a registry entry keyed by a
//! relay-assigned UUID. The spawned polling task moves the entry through
//! `Submitting -> Processing -> {Completed, Failed, Cancelled}`; terminal
//! states are sticky, which is what makes repeated status reads after
//! completion idempotent. Entries never survive a process restart.
//!
//! Lock discipline: the map is behind a `std::sync::RwLock` and no await
//! point is ever reached while a guard is held.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use genrelay_core::job::ResultPayload;

/// How often the sweeper looks for expired entries.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// How long a terminal entry stays readable before the sweeper drops it.
pub const TERMINAL_RETENTION: Duration = Duration::from_secs(600);

/// Lifecycle state of a tracked job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    /// Accepted by the relay; not yet accepted by the provider.
    Submitting,
    /// Accepted by the provider; polling is under way.
    Processing {
        queue_position: u32,
        wait_time_secs: u32,
    },
    /// Finished; carries the terminal artifact.
    Completed { image_url: String, model: String },
    /// Failed; carries the reason shown to the caller.
    Failed { message: String },
    /// Cancelled by the caller before reaching a terminal provider state.
    Cancelled,
}

impl JobState {
    /// Whether the state can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::Cancelled
        )
    }
}

/// Result of a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The job was in flight and has been cancelled.
    Cancelled,
    /// The job already reached a terminal state.
    AlreadyTerminal,
    /// No job with that id exists.
    NotFound,
}

/// Internal bookkeeping for a single tracked job.
struct TrackedJob {
    state: JobState,
    /// Per-job cancellation token (child of the app shutdown token).
    cancel: CancellationToken,
    /// Last state transition, used for retention sweeping.
    updated_at: Instant,
}

/// Registry of all client-pollable jobs in this process.
#[derive(Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<Uuid, TrackedJob>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job in `Submitting` state.
    ///
    /// Returns the relay-assigned id and the job's cancellation token
    /// (a child of `shutdown`, so app shutdown cancels every poller).
    pub fn register(&self, shutdown: &CancellationToken) -> (Uuid, CancellationToken) {
        let id = Uuid::new_v4();
        let cancel = shutdown.child_token();
        let entry = TrackedJob {
            state: JobState::Submitting,
            cancel: cancel.clone(),
            updated_at: Instant::now(),
        };
        self.jobs.write().unwrap().insert(id, entry);
        (id, cancel)
    }

    /// Current state of a job, if it exists.
    pub fn get(&self, id: &Uuid) -> Option<JobState> {
        self.jobs.read().unwrap().get(id).map(|j| j.state.clone())
    }

    /// Record provider queue progress. Ignored once the job is terminal.
    pub fn mark_processing(&self, id: &Uuid, queue_position: u32, wait_time_secs: u32) {
        self.transition(id, JobState::Processing {
            queue_position,
            wait_time_secs,
        });
    }

    /// Record a successful completion. Ignored once the job is terminal.
    pub fn complete(&self, id: &Uuid, payload: ResultPayload) {
        self.transition(id, JobState::Completed {
            image_url: payload.image_url,
            model: payload.model_used,
        });
    }

    /// Record a failure. Ignored once the job is terminal.
    pub fn fail(&self, id: &Uuid, message: impl Into<String>) {
        self.transition(id, JobState::Failed {
            message: message.into(),
        });
    }

    /// Cancel an in-flight job: trigger its token and mark it `Cancelled`.
    pub fn cancel(&self, id: &Uuid) -> CancelOutcome {
        let mut jobs = self.jobs.write().unwrap();
        match jobs.get_mut(id) {
            None => CancelOutcome::NotFound,
            Some(job) if job.state.is_terminal() => CancelOutcome::AlreadyTerminal,
            Some(job) => {
                job.cancel.cancel();
                job.state = JobState::Cancelled;
                job.updated_at = Instant::now();
                CancelOutcome::Cancelled
            }
        }
    }

    /// Drop terminal entries older than `retention`. Returns how many were
    /// removed. In-flight entries are never touched.
    pub fn prune_expired(&self, retention: Duration) -> usize {
        let mut jobs = self.jobs.write().unwrap();
        let before = jobs.len();
        jobs.retain(|_, job| !(job.state.is_terminal() && job.updated_at.elapsed() >= retention));
        before - jobs.len()
    }

    /// Number of tracked jobs (any state).
    pub fn len(&self) -> usize {
        self.jobs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().unwrap().is_empty()
    }

    /// Apply a state transition unless the job is gone or already terminal.
    fn transition(&self, id: &Uuid, next: JobState) {
        let mut jobs = self.jobs.write().unwrap();
        if let Some(job) = jobs.get_mut(id) {
            if !job.state.is_terminal() {
                job.state = next;
                job.updated_at = Instant::now();
            }
        }
    }
}

/// Spawn the background task that prunes expired terminal entries.
///
/// Runs until `shutdown` is cancelled.
pub fn spawn_sweeper(
    registry: std::sync::Arc<JobRegistry>,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!("Job registry sweeper stopped");
                    return;
                }
                _ = tokio::time::sleep(SWEEP_INTERVAL) => {}
            }

            let removed = registry.prune_expired(TERMINAL_RETENTION);
            if removed > 0 {
                tracing::debug!(removed, remaining = registry.len(), "Pruned expired jobs");
            }
        }
    })
}

//! Job handle and status types for asynchronous generation jobs.
//!
//! A [`JobHandle`] is created once submission succeeds and maps to exactly
//! one terminal status, or is abandoned when the poll budget runs out.
//! [`JobStatus`] is transient -- it is re-derived from the provider on every
//! poll and never persisted.

use crate::generation::ModelGroup;

/// Substituted when the provider reports a fault without a message.
pub const FALLBACK_FAULT_REASON: &str = "Provider reported a fault without a reason";

/// Opaque, vendor-assigned identifier for an in-flight generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: String,
}

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Terminal artifact of a completed generation.
///
/// Only ever constructed with a non-empty `image_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPayload {
    pub image_url: String,
    pub model_used: String,
}

/// Provider-derived status of an in-flight job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    /// Still queued or generating.
    Pending {
        queue_position: u32,
        wait_time_secs: u32,
    },
    /// Finished successfully.
    Done(ResultPayload),
    /// Failed mid-flight; carries a non-empty reason.
    Faulted { reason: String },
}

impl JobStatus {
    /// Build a `Faulted` status, substituting [`FALLBACK_FAULT_REASON`]
    /// when the provider message is empty.
    pub fn faulted(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            FALLBACK_FAULT_REASON.to_string()
        } else {
            reason
        };
        Self::Faulted { reason }
    }

    /// Whether this status ends the polling loop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Faulted { .. })
    }
}

/// A job accepted by the upstream provider, together with the model group
/// that was actually accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedJob {
    pub handle: JobHandle,
    pub models: ModelGroup,
}

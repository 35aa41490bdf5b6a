/// Relay-level error taxonomy.
///
/// Every failure that can reach a caller is one of these variants; the API
/// layer maps each to a fixed HTTP status. The soft "no available worker"
/// signal during model-group fallback is *not* represented here -- it is an
/// internal retry signal, never a caller-visible error.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The request was malformed or rejected by upstream validation.
    /// Not retried; the caller must fix the request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No worker capacity for any requested model group. The caller may
    /// retry later.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The provider accepted the job but it failed mid-flight. Not
    /// retried automatically.
    #[error("Generation failed: {0}")]
    ProviderFault(String),

    /// The status-poll budget was exhausted without a terminal signal.
    /// The caller may resubmit.
    #[error("Generation timed out after {attempts} status checks")]
    Timeout { attempts: u32 },

    /// Explicit upstream throttling. The caller should back off.
    #[error("Rate limited by upstream: {0}")]
    RateLimited(String),

    /// Transport or decoding failure talking to an upstream provider.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Anything that should never happen in normal operation.
    #[error("Internal error: {0}")]
    Internal(String),
}

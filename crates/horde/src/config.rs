//! Tunable parameters for the generation-provider client.
//!
//! Built once at startup from the environment and injected into
//! [`HordeApi`](crate::api::HordeApi) and the polling loop. Nothing in this
//! crate reads process-wide state at call time.

use std::time::Duration;

/// Anonymous API key accepted by the public provider.
pub const ANONYMOUS_API_KEY: &str = "0000000000";

/// Immutable configuration for one upstream generation provider.
#[derive(Debug, Clone)]
pub struct HordeConfig {
    /// Base API URL, e.g. `https://stablehorde.net/api/v2`.
    pub api_url: String,
    /// API key sent in the `apikey` header.
    pub api_key: String,
    /// Value for the `Client-Agent` header the provider asks clients to send.
    pub client_agent: String,
    /// Timeout for one submission call.
    pub submit_timeout: Duration,
    /// Timeout for one status query.
    pub status_timeout: Duration,
    /// Fixed delay between status queries.
    pub poll_interval: Duration,
    /// Maximum number of status queries before a job is declared timed out.
    pub max_poll_attempts: u32,
}

impl Default for HordeConfig {
    fn default() -> Self {
        Self {
            api_url: "https://stablehorde.net/api/v2".to_string(),
            api_key: ANONYMOUS_API_KEY.to_string(),
            client_agent: concat!("genrelay:", env!("CARGO_PKG_VERSION")).to_string(),
            submit_timeout: Duration::from_secs(15),
            status_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(2),
            max_poll_attempts: 45,
        }
    }
}

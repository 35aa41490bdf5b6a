//! REST client for the provider's HTTP endpoints.
//!
//! Wraps job submission (`POST /generate/async`) and status retrieval
//! (`GET /generate/status/{id}`) using [`reqwest`]. Classification of
//! responses into the relay error taxonomy happens in
//! [`submit`](crate::submit) and [`poll`](crate::poll); this layer only
//! speaks the wire format.

use serde::Deserialize;

use crate::config::HordeConfig;

/// HTTP client for a single generation provider.
pub struct HordeApi {
    client: reqwest::Client,
    config: HordeConfig,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Warning attached to an otherwise successful submission response.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitWarning {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Response body of `POST /generate/async`.
///
/// A submission is only usable when `id` is present and no
/// no-available-worker warning was attached.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    /// Server-assigned job identifier.
    pub id: Option<String>,
    /// Kudos charged for the request.
    #[serde(default)]
    pub kudos: f64,
    /// Human-readable note from the provider.
    pub message: Option<String>,
    #[serde(default)]
    pub warnings: Vec<SubmitWarning>,
}

/// One completed generation inside a status response.
#[derive(Debug, Clone, Deserialize)]
pub struct Generation {
    /// Image URL (or payload reference) for the finished artifact.
    #[serde(default)]
    pub img: String,
    /// Model that actually produced the image.
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub seed: String,
    pub worker_id: Option<String>,
    pub worker_name: Option<String>,
}

/// Response body of `GET /generate/status/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub finished: u32,
    #[serde(default)]
    pub processing: u32,
    #[serde(default)]
    pub restarted: u32,
    #[serde(default)]
    pub waiting: u32,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub faulted: bool,
    /// Reason for a fault, when the provider supplies one.
    pub fault_message: Option<String>,
    #[serde(default)]
    pub wait_time: u32,
    #[serde(default)]
    pub queue_position: u32,
    #[serde(default)]
    pub kudos: f64,
    /// False when no active worker can ever satisfy the request.
    #[serde(default = "default_true")]
    pub is_possible: bool,
    #[serde(default)]
    pub generations: Vec<Generation>,
}

fn default_true() -> bool {
    true
}

/// Errors from the provider REST layer.
#[derive(Debug, thiserror::Error)]
pub enum HordeApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the body (or the raw body text).
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

impl HordeApi {
    /// Create a new API client from provider configuration.
    pub fn new(config: HordeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across clients).
    pub fn with_client(client: reqwest::Client, config: HordeConfig) -> Self {
        Self { client, config }
    }

    /// Provider configuration this client was built with.
    pub fn config(&self) -> &HordeConfig {
        &self.config
    }

    /// Submit a generation job.
    ///
    /// Sends `POST /generate/async` with the given payload. Returns the
    /// raw [`SubmitResponse`]; deciding whether it actually carries a
    /// usable job id is the submitter's business.
    pub async fn submit(
        &self,
        payload: &serde_json::Value,
    ) -> Result<SubmitResponse, HordeApiError> {
        let response = self
            .client
            .post(format!("{}/generate/async", self.config.api_url))
            .header("apikey", &self.config.api_key)
            .header("Client-Agent", &self.config.client_agent)
            .timeout(self.config.submit_timeout)
            .json(payload)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Query the status of an in-flight job.
    ///
    /// Sends `GET /generate/status/{id}`.
    pub async fn status(&self, job_id: &str) -> Result<StatusResponse, HordeApiError> {
        let response = self
            .client
            .get(format!("{}/generate/status/{}", self.config.api_url, job_id))
            .header("Client-Agent", &self.config.client_agent)
            .timeout(self.config.status_timeout)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or a [`HordeApiError::Api`] carrying the
    /// status and the body's `message` field (falling back to raw text).
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, HordeApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(HordeApiError::Api {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, HordeApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Pull the `message` field out of a JSON error body, falling back to the
/// raw text when the body is not JSON or has no message.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

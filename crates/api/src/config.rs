//! Server and provider configuration, loaded once at startup.
//!
//! Everything the relay tunes at runtime comes from environment variables
//! parsed here into immutable structs; nothing downstream reads the
//! environment at call time.

use std::time::Duration;

use genrelay_chat::ChatConfig;
use genrelay_horde::config::HordeConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `150`).
    ///
    /// Must comfortably exceed the worst-case synchronous poll
    /// (`max_poll_attempts * poll_interval`), or the timeout layer will cut
    /// waiting clients off before the poll budget does.
    pub request_timeout_secs: u64,
    /// SQLite database URL (default: `sqlite://genrelay.db`).
    pub database_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `150`                      |
    /// | `DATABASE_URL`         | `sqlite://genrelay.db`     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = parse_env("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", 150);

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://genrelay.db".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
        }
    }
}

/// Load generation-provider configuration from environment variables,
/// falling back to [`HordeConfig::default`] for anything unset.
///
/// | Env Var                    | Default                              |
/// |----------------------------|--------------------------------------|
/// | `HORDE_API_URL`            | `https://stablehorde.net/api/v2`     |
/// | `HORDE_API_KEY`            | anonymous key                        |
/// | `HORDE_SUBMIT_TIMEOUT_SECS`| `15`                                 |
/// | `HORDE_STATUS_TIMEOUT_SECS`| `10`                                 |
/// | `HORDE_POLL_INTERVAL_SECS` | `2`                                  |
/// | `HORDE_MAX_POLL_ATTEMPTS`  | `45`                                 |
pub fn horde_config_from_env() -> HordeConfig {
    let defaults = HordeConfig::default();

    HordeConfig {
        api_url: std::env::var("HORDE_API_URL").unwrap_or(defaults.api_url),
        api_key: std::env::var("HORDE_API_KEY").unwrap_or(defaults.api_key),
        client_agent: std::env::var("HORDE_CLIENT_AGENT").unwrap_or(defaults.client_agent),
        submit_timeout: Duration::from_secs(parse_env(
            "HORDE_SUBMIT_TIMEOUT_SECS",
            defaults.submit_timeout.as_secs(),
        )),
        status_timeout: Duration::from_secs(parse_env(
            "HORDE_STATUS_TIMEOUT_SECS",
            defaults.status_timeout.as_secs(),
        )),
        poll_interval: Duration::from_secs(parse_env(
            "HORDE_POLL_INTERVAL_SECS",
            defaults.poll_interval.as_secs(),
        )),
        max_poll_attempts: parse_env("HORDE_MAX_POLL_ATTEMPTS", defaults.max_poll_attempts),
    }
}

/// Load chat-provider configuration from environment variables.
///
/// | Env Var              | Default                          |
/// |----------------------|----------------------------------|
/// | `CHAT_API_URL`       | `https://openrouter.ai/api/v1`   |
/// | `CHAT_API_KEY`       | empty (provider will reject)     |
/// | `CHAT_DEFAULT_MODEL` | `mistralai/mistral-7b-instruct`  |
pub fn chat_config_from_env() -> ChatConfig {
    let defaults = ChatConfig::default();

    ChatConfig {
        api_url: std::env::var("CHAT_API_URL").unwrap_or(defaults.api_url),
        api_key: std::env::var("CHAT_API_KEY").unwrap_or(defaults.api_key),
        default_model: std::env::var("CHAT_DEFAULT_MODEL").unwrap_or(defaults.default_model),
        request_timeout: Duration::from_secs(parse_env(
            "CHAT_REQUEST_TIMEOUT_SECS",
            defaults.request_timeout.as_secs(),
        )),
    }
}

/// Parse an environment variable, panicking on a malformed value.
///
/// Misconfiguration should fail fast at startup rather than surface as
/// odd behaviour later.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be a valid value: {e}")),
        Err(_) => default,
    }
}

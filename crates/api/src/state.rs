use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::jobs::JobRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: genrelay_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Generation-provider client.
    pub horde: Arc<genrelay_horde::api::HordeApi>,
    /// Chat-completion relay client.
    pub chat: Arc<genrelay_chat::ChatClient>,
    /// In-memory registry of client-pollable generation jobs.
    pub registry: Arc<JobRegistry>,
    /// App-wide shutdown token; every per-job cancellation token is a
    /// child of this one.
    pub shutdown: CancellationToken,
}

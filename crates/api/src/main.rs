use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genrelay_api::config::{chat_config_from_env, horde_config_from_env, ServerConfig};
use genrelay_api::jobs::{spawn_sweeper, JobRegistry};
use genrelay_api::router::build_app_router;
use genrelay_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "genrelay_api=debug,genrelay_horde=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let pool = genrelay_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    genrelay_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    genrelay_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    // --- Provider clients ---
    let horde_config = horde_config_from_env();
    tracing::info!(api_url = %horde_config.api_url, "Generation provider configured");
    let horde = Arc::new(genrelay_horde::api::HordeApi::new(horde_config));

    let chat = Arc::new(genrelay_chat::ChatClient::new(chat_config_from_env()));

    // --- Job registry ---
    let shutdown = CancellationToken::new();
    let registry = Arc::new(JobRegistry::new());
    let sweeper_handle = spawn_sweeper(Arc::clone(&registry), shutdown.clone());
    tracing::info!("Job registry sweeper started");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        horde,
        chat,
        registry,
        shutdown: shutdown.clone(),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Serve ---
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .expect("Server error");

    // Stop the sweeper and every in-flight polling task.
    shutdown.cancel();
    let _ = sweeper_handle.await;
    tracing::info!("Shutdown complete");
}

/// Resolve when SIGINT or SIGTERM arrives, cancelling the app token so
/// polling tasks stop before the server drains.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}

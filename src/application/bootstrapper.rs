//! Application bootstrapper
//!
//! Handles initialization and serving for both binaries: the `wander` API and
//! the host-side `wander-dashboard`.

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    Router,
};
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, CONFIG};
use crate::db;
use crate::endpoints;
use crate::services::{DockerCli, RedisCache, SharedCache, SharedRuntime};
use crate::state::{AppState, DashboardState};

/// Bootstrap and run the API
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting Wander backend v{}", CONFIG.version);

    let state = init_services().await?;
    let db = state.db.clone();

    let app = create_app(state);
    serve(app, &CONFIG.server.bind_addr()).await?;

    tracing::info!("Closing database pool");
    if let Err(e) = db.close().await {
        tracing::warn!("Failed to close database pool: {}", e);
    }

    Ok(())
}

/// Bootstrap and run the host-side setup dashboard
pub async fn run_dashboard() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting Wander setup dashboard v{}", CONFIG.version);

    let config = Arc::new(CONFIG.clone());
    let runtime: SharedRuntime = Arc::new(DockerCli::new(config.setup.exec_timeout));
    let state = DashboardState::new(config, runtime);

    let app = create_dashboard_app(state);
    serve(app, &CONFIG.dashboard.bind_addr()).await
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("wander={},tower_http=info", CONFIG.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(false))
        .init();
}

/// Connect to PostgreSQL and Redis; either failing aborts startup
async fn init_services() -> anyhow::Result<AppState> {
    let config = Arc::new(CONFIG.clone());

    let conn = db::connect(&config.database).await?;
    tracing::info!("Database connection established");

    let cache = RedisCache::connect(&config.cache).await?;
    tracing::info!(
        "Redis connection established at {}:{}",
        config.cache.host,
        config.cache.port
    );
    let cache: SharedCache = Arc::new(cache);

    let runtime: SharedRuntime = Arc::new(DockerCli::new(config.setup.exec_timeout));

    Ok(AppState::new(config, conn, cache, runtime))
}

fn api_cors(config: &Config) -> CorsLayer {
    if config.server.allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the API router with middleware
pub fn create_app(state: AppState) -> Router {
    let cors = api_cors(&state.config);

    endpoints::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Create the dashboard router with middleware
pub fn create_dashboard_app(state: DashboardState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    endpoints::create_dashboard_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the HTTP server and run until a shutdown signal arrives
async fn serve(app: Router, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}


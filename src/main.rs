//! Daggerheart Engine - Backend API for character and campaign management
//!
//! The Engine is the backend server that:
//! - Stores characters, the rules catalog and campaigns in SQLite
//! - Serves character sheets with derived stats
//! - Tracks hope, stress and hit points with debounced autosave
//! - Walks players through character creation

mod application;
mod domain;
mod infrastructure;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http;
use crate::infrastructure::persistence::{seed_catalog, CatalogSeed};
use crate::infrastructure::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daggerheart_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Daggerheart Engine");

    // Load configuration
    let config = AppConfig::load()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Database: {}", config.database_url);
    tracing::info!(
        "  Autosave: {}ms debounce, {} retries",
        config.autosave_debounce_ms,
        config.autosave_max_retries
    );

    // Initialize application state
    let state = AppState::new(config).await?;
    let state = Arc::new(state);
    tracing::info!("Application state initialized");

    // Seed the rules catalog
    let seed = CatalogSeed::load(state.config.catalog_seed_path.as_deref())?;
    seed_catalog(&state.repository.catalog(), &seed).await?;

    // Idle sweep (closes stale resource trackers and expires abandoned drafts)
    let idle_sweeper = {
        let resource_service = state.resource_service.clone();
        let builder_service = state.builder_service.clone();
        let idle_timeout = state.config.idle_timeout();
        let mut interval = tokio::time::interval(state.config.idle_sweep_interval());
        tokio::spawn(async move {
            tracing::info!("Starting idle session sweeper");
            loop {
                interval.tick().await;
                resource_service.evict_idle(idle_timeout).await;
                builder_service.expire_idle(idle_timeout).await;
            }
        })
    };

    // Build the router
    let app = Router::new()
        .route("/health", get(health_check))
        // Merge REST API routes
        .merge(http::create_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.server_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Run server until Ctrl+C, then write out any pending resource changes
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    idle_sweeper.abort();
    tracing::info!("Flushing open character sessions...");
    state.resource_service.flush_all().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn health_check() -> &'static str {
    "OK"
}

// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::infrastructure::config::{load_dashboard_config, load_influx_config, load_queries_config};
use crate::infrastructure::influx_repository::InfluxRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    close_session, create_session, get_layout, get_panels, get_session, health_check,
    select_range, session_events,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let influx_config = load_influx_config()?;
    let dashboard_config = load_dashboard_config()?;
    let queries_config = load_queries_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(InfluxRepository::new(
        influx_config.influx.host,
        influx_config.influx.token,
        influx_config.influx.database,
        queries_config,
    ));

    // Create services (application layer)
    let dashboard_service = DashboardService::new(
        repository,
        dashboard_config.panels,
        dashboard_config.sessions,
    );
    dashboard_service.spawn_reaper();

    // Create application state
    let state = Arc::new(AppState { dashboard_service });

    // Build router (presentation layer)
    // Note: JSON responses are Brotli-compressed in the response builder,
    // so no CompressionLayer here
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/layout", get(get_layout))
        .route("/api/panels", get(get_panels))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(close_session))
        .route("/api/sessions/:id/range", put(select_range))
        .route("/api/sessions/:id/events", get(session_events))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = dashboard_config.server.bind.parse()?;
    tracing::info!("Starting inventory-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

//! Web surface for KB Query.
//!
//! Serves the JSON query API consumed by browser clients, a small
//! server-rendered HTML page, and health/config probes.

mod error_handler;
mod routes;
mod state;

#[cfg(test)]
mod tests;

use axum::{
    routing::{get, post},
    Router,
};
use kbquery_core::{AppConfig, AppResult};
use tokio::signal;
use tower_http::trace::TraceLayer;

pub use error_handler::ApiError;
pub use state::AppState;

use crate::routes::{
    config_route::kb_config, health_route::health, page_route::{ask_form, index},
    query_route::submit_query,
};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ask", post(ask_form))
        .route("/api/query", post(submit_query))
        .route("/api/config", get(kb_config))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl+C.
pub async fn start(config: &AppConfig) -> AppResult<()> {
    let state = AppState::from_config(config)?;
    let app = router(state);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&config.server_address).await?;
    tracing::info!(
        "Serving knowledge base '{}' on http://{}",
        config.knowledge_base_name,
        listener.local_addr()?
    );

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

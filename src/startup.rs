//! Application startup and server initialization.
//!
//! Registers the request instruments, builds the router and serves it.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ConfigV1;
use crate::error::StartupError;
use crate::metrics::Metrics;
use crate::routes;
use crate::state::AppState;

/// Initializes and runs the application server.
///
/// # Errors
///
/// Returns an error if the instruments cannot be registered, the server fails
/// to bind to the configured address, or serving fails.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), StartupError> {
    let metrics = Metrics::from_config(&config.metrics)?;
    info!(
        counter = %config.metrics.request_counter.name,
        histogram = %config.metrics.latency_histogram.name,
        latency_labels = ?config.metrics.latency_labels,
        "Registered request metrics"
    );

    let state = AppState {
        config: config.clone(),
        metrics,
    };

    let app = routes::create_router(state);

    info!("Starting server on {}", config.bind_address);
    let listener = TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

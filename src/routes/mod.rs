//! HTTP route definitions and handlers.
//!
//! This module organizes the demo endpoints, health check and metrics
//! exposition into a single router wrapped by the request metrics middleware.

mod demo_routes;
mod health_routes;
mod metrics_routes;

use crate::metrics::Metrics;
use crate::middleware::track_metrics;
use crate::state::AppState;
use axum::{Router, middleware};

/// Creates the application router with all configured routes.
///
/// Routes merged before the metrics layer, and the fallback, are recorded by
/// [`track_metrics`].
/// The writer-style routes record themselves and are merged afterwards so
/// their requests are not counted twice.
pub fn create_router(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    Router::new()
        .merge(demo_routes::routes())
        .merge(health_routes::routes())
        .merge(metrics_routes::routes())
        .fallback(demo_routes::not_found)
        .layer(middleware::from_fn_with_state(
            metrics.clone(),
            track_metrics::<Metrics>,
        ))
        .merge(demo_routes::writer_routes(metrics))
        .with_state(state)
}

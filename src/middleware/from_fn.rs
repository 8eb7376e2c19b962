//! Axum function middleware.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::collector::InFlight;
use crate::metrics::MetricsRecorder;

/// Records request metrics around the rest of the axum middleware chain.
///
/// ```ignore
/// Router::new()
///     .route("/", get(handler))
///     .layer(middleware::from_fn_with_state(metrics, track_metrics::<Metrics>))
/// ```
///
/// Added with `Router::layer`, the route template is available as
/// `MatchedPath`. The layer only wraps a fallback that was set before it, so
/// register one first to count 404s; those are labelled `unmatched`.
pub async fn track_metrics<R: MetricsRecorder>(
    State(recorder): State<R>,
    request: Request,
    next: Next,
) -> Response {
    let in_flight = InFlight::start(&request);
    let response = next.run(request).await;
    in_flight.record(&recorder, &response);
    response
}

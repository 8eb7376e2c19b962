//! Demonstration endpoints.

use crate::metrics::Metrics;
use crate::middleware::{ResponseWriter, WriterService, handler_fn};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::Path;
use axum::http::{HeaderValue, Request, StatusCode, header};
use axum::response::IntoResponse;
use axum::{Router, routing::get};

/// Registers the handler-style demo routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(hello))
        .route("/fail", get(fail))
        .route("/users/:id", get(user))
}

/// Registers routes served by writer-style handlers.
pub fn writer_routes(metrics: Metrics) -> Router<AppState> {
    Router::new().route_service(
        "/legacy",
        WriterService::new(handler_fn(legacy), metrics),
    )
}

/// Fallback for requests that match no route.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

async fn hello() -> impl IntoResponse {
    (StatusCode::OK, "Hello, world!")
}

async fn fail() -> impl IntoResponse {
    (StatusCode::BAD_REQUEST, "Hello, world!")
}

async fn user(Path(id): Path<u64>) -> impl IntoResponse {
    (StatusCode::OK, format!("User {}", id))
}

/// Writes a body without an explicit status, which is sent as 200.
fn legacy(_request: &Request<Body>, writer: &mut dyn ResponseWriter) {
    writer
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    writer.write(b"Hello from a writer handler!");
}

//! Request metrics middleware, one adapter per way of plugging into an HTTP
//! stack.
//!
//! - [`MetricsLayer`]: a `tower::Layer` for any `Service<http::Request<B>>`,
//!   meant to sit inside an axum router.
//! - [`track_metrics`]: an axum function middleware for
//!   `axum::middleware::from_fn_with_state`.
//! - [`WriterService`]: serves handlers that write into a [`ResponseWriter`]
//!   rather than returning a response.
//! - [`HyperMetrics`]: wraps a bare `hyper::service::Service`, resolving route
//!   templates through a [`RouteTable`].
//!
//! Requests without a route template are labelled `unmatched`.
//!
//! All four record one [`MetricSample`](crate::metrics::MetricSample) per
//! request and return the downstream result untouched.

mod from_fn;
mod hyper_service;
mod layer;
mod writer;

pub use from_fn::track_metrics;
pub use hyper_service::{HyperMetrics, RouteTable};
pub use layer::{MetricsLayer, MetricsService, ResponseFuture};
pub use writer::{
    BufferedWriter, Handler, HandlerFn, ResponseWriter, StatusCapture, WriterService, handler_fn,
};

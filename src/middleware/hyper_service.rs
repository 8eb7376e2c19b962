//! Adapter for services served directly by hyper.
//!
//! There is no router in front of such a service, so route templates come
//! from a [`RouteTable`] the caller fills in. Paths that match no template are
//! labelled `unmatched`.

use std::sync::Arc;

use http::{Request, Response};

use super::layer::ResponseFuture;
use crate::collector::InFlight;
use crate::error::MetricsError;
use crate::metrics::MetricsRecorder;

/// Route templates in axum syntax, e.g. `/users/:id` or `/static/*file`.
#[derive(Clone, Default)]
pub struct RouteTable {
    router: matchit::Router<String>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template. Conflicting or malformed templates are rejected.
    pub fn route(mut self, template: &str) -> Result<Self, MetricsError> {
        self.router
            .insert(template, template.to_owned())
            .map_err(|source| MetricsError::Route {
                template: template.to_owned(),
                source,
            })?;
        Ok(self)
    }

    /// The template matching `path`, if any.
    pub fn resolve(&self, path: &str) -> Option<&str> {
        self.router.at(path).ok().map(|matched| matched.value.as_str())
    }
}

/// Wraps a `hyper::service::Service` and records request metrics for it.
pub struct HyperMetrics<S, R> {
    inner: S,
    recorder: R,
    routes: Arc<RouteTable>,
}

impl<S: Clone, R: Clone> Clone for HyperMetrics<S, R> {
    fn clone(&self) -> Self {
        HyperMetrics {
            inner: self.inner.clone(),
            recorder: self.recorder.clone(),
            routes: self.routes.clone(),
        }
    }
}

impl<S, R: MetricsRecorder> HyperMetrics<S, R> {
    pub fn new(inner: S, recorder: R, routes: RouteTable) -> Self {
        HyperMetrics {
            inner,
            recorder,
            routes: Arc::new(routes),
        }
    }
}

impl<S, R, B, ResBody> hyper::service::Service<Request<B>> for HyperMetrics<S, R>
where
    S: hyper::service::Service<Request<B>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    R: MetricsRecorder,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = ResponseFuture<Self::Response, Self::Error>;

    fn call(&self, request: Request<B>) -> Self::Future {
        let mut in_flight = InFlight::start(&request);
        in_flight.resolve_route(self.routes.resolve(request.uri().path()).map(str::to_owned));
        let recorder = self.recorder.clone();
        let future = self.inner.call(request);

        Box::pin(async move {
            let result = future.await;
            in_flight.record(&recorder, &result);
            result
        })
    }
}

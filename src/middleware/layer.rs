//! Tower layer recording request metrics.

use http::{Request, Response};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::collector::InFlight;
use crate::metrics::MetricsRecorder;

/// Layer that records request metrics for the wrapped service.
///
/// The path label comes from axum's `MatchedPath`, which only exists once
/// routing has happened. Add the layer with `Router::layer` or
/// `Router::route_layer`; wrapped around a whole router or a plain tower
/// stack every request is labelled `unmatched`.
#[derive(Clone)]
pub struct MetricsLayer<R> {
    recorder: R,
}

impl<R> MetricsLayer<R> {
    pub fn new(recorder: R) -> Self {
        MetricsLayer { recorder }
    }
}

impl<S, R: Clone> Layer<S> for MetricsLayer<R> {
    type Service = MetricsService<S, R>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService {
            inner,
            recorder: self.recorder.clone(),
        }
    }
}

/// Middleware that records one sample per call to the inner service.
#[derive(Clone)]
pub struct MetricsService<S, R> {
    inner: S,
    recorder: R,
}

pub type ResponseFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;

impl<S, R, ReqBody, ResBody> Service<Request<ReqBody>> for MetricsService<S, R>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    R: MetricsRecorder,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = ResponseFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let in_flight = InFlight::start(&request);
        let future = self.inner.call(request);
        let recorder = self.recorder.clone();

        Box::pin(async move {
            let result = future.await;
            // Errors carry no status; they are counted with an unknown code.
            in_flight.record(&recorder, &result);
            result
        })
    }
}

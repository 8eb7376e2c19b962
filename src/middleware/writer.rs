//! Adapter for handlers that write their response instead of returning it.
//!
//! Such a handler may set a status, write body bytes, both, or neither, so the
//! status is not known from a return value. [`StatusCapture`] sits between
//! the handler and the real writer and remembers the first status written.

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::BoxError;
use axum::body::{Body, Bytes, HttpBody};
use http::{HeaderMap, Request, Response, StatusCode};
use tokio::task;
use tracing::{debug, error};

use super::layer::ResponseFuture;
use crate::collector::InFlight;
use crate::metrics::MetricsRecorder;

/// Response-writing capability handed to a [`Handler`].
pub trait ResponseWriter {
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Sets the response status. Only the first call has an effect.
    fn write_header(&mut self, status: StatusCode);

    /// Appends to the body. Implies `write_header(200)` if no status was set.
    fn write(&mut self, chunk: &[u8]);
}

/// Collects the response in memory.
#[derive(Debug, Default)]
pub struct BufferedWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl BufferedWriter {
    pub fn into_response(self) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseWriter for BufferedWriter {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        match self.status {
            None => self.status = Some(status),
            Some(sent) => debug!(
                sent = sent.as_u16(),
                ignored = status.as_u16(),
                "Superfluous write_header call"
            ),
        }
    }

    fn write(&mut self, chunk: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(chunk);
    }
}

/// Decorator recording the first status code written through it.
#[derive(Debug)]
pub struct StatusCapture<W> {
    inner: W,
    status: Option<StatusCode>,
}

impl<W: ResponseWriter> StatusCapture<W> {
    pub fn new(inner: W) -> Self {
        StatusCapture {
            inner,
            status: None,
        }
    }

    /// The captured status, or 200 if the handler never wrote one.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: ResponseWriter> ResponseWriter for StatusCapture<W> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
        self.inner.write_header(status);
    }

    fn write(&mut self, chunk: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.inner.write(chunk);
    }
}

/// A handler in the response-writer style.
pub trait Handler: Send + Sync + 'static {
    fn serve(&self, request: &Request<Body>, writer: &mut dyn ResponseWriter);
}

/// Handler backed by a closure; see [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&Request<Body>, &mut dyn ResponseWriter) + Send + Sync + 'static,
{
    fn serve(&self, request: &Request<Body>, writer: &mut dyn ResponseWriter) {
        (self.f)(request, writer)
    }
}

/// Wraps a closure as a [`Handler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&Request<Body>, &mut dyn ResponseWriter) + Send + Sync + 'static,
{
    HandlerFn { f }
}

/// Serves a [`Handler`] and records request metrics for it.
///
/// Usable as a tower service (e.g. `Router::route_service`) or directly as a
/// hyper service. Handlers are synchronous, so each one runs on the blocking
/// thread pool. A handler that panics is answered and recorded as a 500.
pub struct WriterService<H, R> {
    handler: Arc<H>,
    recorder: R,
}

impl<H, R: Clone> Clone for WriterService<H, R> {
    fn clone(&self) -> Self {
        WriterService {
            handler: self.handler.clone(),
            recorder: self.recorder.clone(),
        }
    }
}

impl<H: Handler, R: MetricsRecorder> WriterService<H, R> {
    pub fn new(handler: H, recorder: R) -> Self {
        WriterService {
            handler: Arc::new(handler),
            recorder,
        }
    }

    fn respond(&self, request: Request<Body>) -> ResponseFuture<Response<Body>, Infallible> {
        let in_flight = InFlight::start(&request);
        let handler = self.handler.clone();
        let recorder = self.recorder.clone();

        Box::pin(async move {
            let served = task::spawn_blocking(move || {
                let mut writer = StatusCapture::new(BufferedWriter::default());
                handler.serve(&request, &mut writer);
                writer
            })
            .await;

            let response = match served {
                Ok(writer) => {
                    in_flight.record(&recorder, &writer.status());
                    writer.into_inner().into_response()
                }
                Err(e) => {
                    error!(error = %e, "Response writer handler did not complete");
                    in_flight.record(&recorder, &StatusCode::INTERNAL_SERVER_ERROR);
                    let mut response = Response::new(Body::empty());
                    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                    response
                }
            };
            Ok(response)
        })
    }
}

impl<H: Handler, R: MetricsRecorder> tower::Service<Request<Body>> for WriterService<H, R> {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = ResponseFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        self.respond(request)
    }
}

impl<H, R, B> hyper::service::Service<Request<B>> for WriterService<H, R>
where
    H: Handler,
    R: MetricsRecorder,
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = ResponseFuture<Self::Response, Self::Error>;

    fn call(&self, request: Request<B>) -> Self::Future {
        self.respond(request.map(Body::new))
    }
}

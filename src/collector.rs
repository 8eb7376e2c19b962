//! Request capture shared by every middleware adapter.
//!
//! An adapter reads the request through [`RequestContext`] before handing it
//! to the next handler, then reads whatever came back through [`Outcome`]:
//!
//! ```ignore
//! let in_flight = InFlight::start(&request);
//! let output = next(request).await;
//! in_flight.record(&recorder, &output);
//! output
//! ```

use std::borrow::Cow;
use std::time::Instant;

use axum::extract::MatchedPath;
use http::{Request, Response, StatusCode};
use tracing::trace;

use crate::metrics::{MetricSample, MetricsRecorder};

/// Path label for requests that did not match a registered route.
pub const UNMATCHED_PATH: &str = "unmatched";

/// Read access to the fields a sample needs from an incoming request.
pub trait RequestContext {
    fn method(&self) -> &str;

    /// The registered route template, e.g. `/users/:id`, if routing has
    /// resolved one.
    fn route_template(&self) -> Option<Cow<'_, str>>;
}

impl<B> RequestContext for Request<B> {
    fn method(&self) -> &str {
        Request::method(self).as_str()
    }

    fn route_template(&self) -> Option<Cow<'_, str>> {
        self.extensions()
            .get::<MatchedPath>()
            .map(|matched| Cow::Borrowed(matched.as_str()))
    }
}

/// Status code of whatever the next handler returned.
pub trait Outcome {
    fn status_code(&self) -> Option<u16>;
}

impl<B> Outcome for Response<B> {
    fn status_code(&self) -> Option<u16> {
        Some(self.status().as_u16())
    }
}

impl Outcome for StatusCode {
    fn status_code(&self) -> Option<u16> {
        Some(self.as_u16())
    }
}

impl Outcome for u16 {
    fn status_code(&self) -> Option<u16> {
        Some(*self)
    }
}

impl<T: Outcome, E> Outcome for Result<T, E> {
    fn status_code(&self) -> Option<u16> {
        self.as_ref().ok().and_then(T::status_code)
    }
}

/// A request that has been seen but not yet completed.
#[derive(Debug)]
pub struct InFlight {
    method: String,
    path: String,
    start: Instant,
}

impl InFlight {
    /// Starts the clock and copies method and route template out of `ctx`.
    ///
    /// Without a template the path is [`UNMATCHED_PATH`], never the raw URI,
    /// so the label set stays bounded.
    pub fn start<C: RequestContext + ?Sized>(ctx: &C) -> Self {
        InFlight {
            method: ctx.method().to_owned(),
            path: ctx
                .route_template()
                .map(Cow::into_owned)
                .unwrap_or_else(|| UNMATCHED_PATH.to_owned()),
            start: Instant::now(),
        }
    }

    /// Replaces the path with a template resolved while the request was
    /// being handled. `None` keeps the current path.
    pub fn resolve_route(&mut self, template: Option<String>) {
        if let Some(template) = template {
            self.path = template;
        }
    }

    pub fn finish<O: Outcome + ?Sized>(self, outcome: &O) -> MetricSample {
        MetricSample {
            method: self.method,
            path: self.path,
            status_code: outcome.status_code(),
            start_time: self.start,
        }
    }

    /// Completes the request and records it.
    pub fn record<R, O>(self, recorder: &R, outcome: &O)
    where
        R: MetricsRecorder,
        O: Outcome + ?Sized,
    {
        let sample = self.finish(outcome);
        trace!(
            method = %sample.method,
            path = %sample.path,
            status = ?sample.status_code,
            "Recording request metrics"
        );
        sample.record(recorder);
    }
}

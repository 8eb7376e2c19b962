//! Metrics recording implementation using Prometheus.

use prometheus::{
    CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use crate::config::{LatencyLabels, MetricsConfig};
use crate::error::MetricsError;

/// Label value used for the `code` label when no status code is known.
pub const UNKNOWN_STATUS: &str = "0";

/// Trait for recording HTTP request metrics.
pub trait MetricsRecorder: Clone + Send + Sync + 'static {
    /// Counts one completed request.
    fn record_request(&self, method: &str, path: &str, status_code: Option<u16>);

    /// Observes the time elapsed since `start`, in seconds.
    fn record_latency(&self, method: &str, path: &str, start: Instant);
}

/// Prometheus metrics collector.
///
/// Owns the request counter and latency histogram. Clones share the same
/// instruments and registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    latency_labels: LatencyLabels,

    http_requests_total: CounterVec,
    http_request_latency_seconds: HistogramVec,
}

impl Metrics {
    /// Creates the default instruments in a fresh registry.
    pub fn new() -> Result<Self, MetricsError> {
        Self::from_config(&MetricsConfig::default())
    }

    /// Creates the configured instruments in a fresh registry.
    pub fn from_config(config: &MetricsConfig) -> Result<Self, MetricsError> {
        Self::with_registry(Arc::new(Registry::new()), config)
    }

    /// Registers the configured instruments into `registry`.
    ///
    /// Fails if either instrument name is already taken in that registry, so
    /// calling this twice against one registry never duplicates a series.
    /// Both instruments are validated before anything is registered, and a
    /// failed histogram registration takes the counter back out, so a failed
    /// call leaves the registry as it found it.
    pub fn with_registry(
        registry: Arc<Registry>,
        config: &MetricsConfig,
    ) -> Result<Self, MetricsError> {
        let counter = &config.request_counter;
        let counter_opts = Opts::new(counter.name.as_str(), counter.help.as_str());
        let counter_labels = ["method", "path", "code"];
        let counter_error = |source| MetricsError::Registration {
            name: counter.name.clone(),
            source,
        };

        let histogram = &config.latency_histogram;
        let histogram_opts = HistogramOpts::new(histogram.name.as_str(), histogram.help.as_str())
            .buckets(config.buckets.clone());
        let histogram_labels = config.latency_labels.label_names();
        let histogram_error = |source| MetricsError::Registration {
            name: histogram.name.clone(),
            source,
        };

        // The register macros unwrap construction errors, and buckets are
        // only checked when a child histogram is created.
        CounterVec::new(counter_opts.clone(), &counter_labels).map_err(counter_error)?;
        Histogram::with_opts(histogram_opts.clone())
            .and_then(|_| HistogramVec::new(histogram_opts.clone(), histogram_labels))
            .map_err(histogram_error)?;

        let http_requests_total =
            register_counter_vec_with_registry!(counter_opts, &counter_labels, registry.clone())
                .map_err(counter_error)?;

        let http_request_latency_seconds = match register_histogram_vec_with_registry!(
            histogram_opts,
            histogram_labels,
            registry.clone()
        ) {
            Ok(histogram_vec) => histogram_vec,
            Err(source) => {
                if let Err(e) = registry.unregister(Box::new(http_requests_total.clone())) {
                    warn!(error = %e, "Failed to roll back request counter registration");
                }
                return Err(histogram_error(source));
            }
        };

        Ok(Metrics {
            registry,
            latency_labels: config.latency_labels,
            http_requests_total,
            http_request_latency_seconds,
        })
    }

    /// Registry holding the instruments.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(MetricsError::Encode)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl MetricsRecorder for Metrics {
    fn record_request(&self, method: &str, path: &str, status_code: Option<u16>) {
        let code = status_code.map(|c| c.to_string());
        let code = code.as_deref().unwrap_or(UNKNOWN_STATUS);
        self.http_requests_total
            .with_label_values(&[method, path, code])
            .inc();
    }

    fn record_latency(&self, method: &str, path: &str, start: Instant) {
        let elapsed = start.elapsed().as_secs_f64();
        let histogram = match self.latency_labels {
            LatencyLabels::MethodPath => self
                .http_request_latency_seconds
                .with_label_values(&[method, path]),
            LatencyLabels::Path => self.http_request_latency_seconds.with_label_values(&[path]),
        };
        histogram.observe(elapsed);
    }
}

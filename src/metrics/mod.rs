//! Metrics collection and exposition for Prometheus.
//!
//! This module owns the two request instruments and the sample type every
//! middleware adapter records through.

mod recorder;
mod sample;

pub use recorder::{Metrics, MetricsRecorder, UNKNOWN_STATUS};
pub use sample::MetricSample;

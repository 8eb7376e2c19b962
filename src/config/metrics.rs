use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Name and help text of a single instrument.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct InstrumentConfig {
    pub name: String,
    pub help: String,
}

/// Label set used by the latency histogram.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LatencyLabels {
    /// `{method, path}`, the same keys the request counter uses (minus `code`).
    #[default]
    MethodPath,
    /// `{path}` only.
    Path,
}

impl LatencyLabels {
    pub fn label_names(&self) -> &'static [&'static str] {
        match self {
            LatencyLabels::MethodPath => &["method", "path"],
            LatencyLabels::Path => &["path"],
        }
    }
}

/// Definition of the two request instruments.
///
/// Every field has a default, so an empty `metrics:` section (or none at all)
/// yields the standard `app_http_request_totals` and
/// `app_http_request_latency_seconds` instruments.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct MetricsConfig {
    #[serde(default = "default_request_counter")]
    pub request_counter: InstrumentConfig,
    #[serde(default = "default_latency_histogram")]
    pub latency_histogram: InstrumentConfig,
    /// Histogram bucket upper bounds, in seconds.
    #[serde(default = "default_buckets")]
    pub buckets: Vec<f64>,
    #[serde(default)]
    pub latency_labels: LatencyLabels,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            request_counter: default_request_counter(),
            latency_histogram: default_latency_histogram(),
            buckets: default_buckets(),
            latency_labels: LatencyLabels::default(),
        }
    }
}

pub const REQUEST_COUNTER_NAME: &str = "app_http_request_totals";
pub const LATENCY_HISTOGRAM_NAME: &str = "app_http_request_latency_seconds";
pub const DEFAULT_BUCKETS: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];

fn default_request_counter() -> InstrumentConfig {
    InstrumentConfig {
        name: REQUEST_COUNTER_NAME.to_string(),
        help: "The total number of application request http".to_string(),
    }
}

fn default_latency_histogram() -> InstrumentConfig {
    InstrumentConfig {
        name: LATENCY_HISTOGRAM_NAME.to_string(),
        help: "Latency of HTTP requests.".to_string(),
    }
}

fn default_buckets() -> Vec<f64> {
    DEFAULT_BUCKETS.to_vec()
}

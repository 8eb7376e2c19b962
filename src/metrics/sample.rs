//! A single completed request, ready to be recorded.

use std::time::Instant;

use super::MetricsRecorder;

/// Observable facts about one completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSample {
    pub method: String,
    /// Route template when known (e.g. `/users/:id`), `unmatched` otherwise.
    pub path: String,
    /// `None` when the downstream handler failed without producing a response.
    pub status_code: Option<u16>,
    pub start_time: Instant,
}

impl MetricSample {
    /// Writes the request counter, then the latency histogram.
    pub fn record<R: MetricsRecorder>(&self, recorder: &R) {
        recorder.record_request(&self.method, &self.path, self.status_code);
        recorder.record_latency(&self.method, &self.path, self.start_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CallLog(Arc<Mutex<Vec<String>>>);

    impl MetricsRecorder for CallLog {
        fn record_request(&self, method: &str, path: &str, status_code: Option<u16>) {
            self.0
                .lock()
                .unwrap()
                .push(format!("request {method} {path} {status_code:?}"));
        }

        fn record_latency(&self, method: &str, path: &str, _start: Instant) {
            self.0.lock().unwrap().push(format!("latency {method} {path}"));
        }
    }

    #[test]
    fn records_request_before_latency() {
        let log = CallLog::default();
        let sample = MetricSample {
            method: "GET".to_string(),
            path: "/users/:id".to_string(),
            status_code: Some(404),
            start_time: Instant::now(),
        };

        sample.record(&log);

        let calls = log.0.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                "request GET /users/:id Some(404)".to_string(),
                "latency GET /users/:id".to_string(),
            ]
        );
    }
}

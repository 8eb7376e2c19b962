#![allow(dead_code)]

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, Response};
use prometheus::Registry;
use prometheus::proto::Metric;

pub const COUNTER: &str = "app_http_request_totals";
pub const HISTOGRAM: &str = "app_http_request_latency_seconds";

pub fn request(method: Method, path: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn get_request(path: &str) -> Request<Body> {
    request(Method::GET, path)
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("body is not UTF-8")
}

/// Finds the series of `name` whose label set is exactly `labels`.
fn find_metric(registry: &Registry, name: &str, labels: &[(&str, &str)]) -> Option<Metric> {
    registry
        .gather()
        .into_iter()
        .filter(|family| family.get_name() == name)
        .flat_map(|family| family.get_metric().to_vec())
        .find(|metric| {
            let pairs = metric.get_label();
            pairs.len() == labels.len()
                && labels.iter().all(|(k, v)| {
                    pairs
                        .iter()
                        .any(|pair| pair.get_name() == *k && pair.get_value() == *v)
                })
        })
}

pub fn counter_value(registry: &Registry, labels: &[(&str, &str)]) -> f64 {
    find_metric(registry, COUNTER, labels)
        .map(|m| m.get_counter().get_value())
        .unwrap_or(0.0)
}

pub fn histogram_count(registry: &Registry, labels: &[(&str, &str)]) -> u64 {
    find_metric(registry, HISTOGRAM, labels)
        .map(|m| m.get_histogram().get_sample_count())
        .unwrap_or(0)
}

pub fn histogram_sum(registry: &Registry, labels: &[(&str, &str)]) -> f64 {
    find_metric(registry, HISTOGRAM, labels)
        .map(|m| m.get_histogram().get_sample_sum())
        .unwrap_or(0.0)
}

/// Number of distinct series recorded for `name`.
pub fn series_count(registry: &Registry, name: &str) -> usize {
    registry
        .gather()
        .iter()
        .filter(|family| family.get_name() == name)
        .map(|family| family.get_metric().len())
        .sum()
}

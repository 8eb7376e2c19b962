mod common;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Router, middleware};
use common::{body_string, counter_value, get_request, histogram_count, request};
use futures::future::join_all;
use prometrics::config::{LatencyLabels, MetricsConfig};
use prometrics::metrics::Metrics;
use prometrics::middleware::track_metrics;
use tower::ServiceExt;

struct MaintenanceError;

impl IntoResponse for MaintenanceError {
    fn into_response(self) -> Response {
        (StatusCode::SERVICE_UNAVAILABLE, "down for maintenance").into_response()
    }
}

fn app(metrics: Metrics) -> Router {
    Router::new()
        .route("/", get(|| async { "Hello, world!" }))
        .route(
            "/fail",
            get(|| async { (StatusCode::BAD_REQUEST, "Hello, world!") }),
        )
        .route(
            "/orders/:order_id/items/:item_id",
            post(|| async { StatusCode::CREATED }),
        )
        .route(
            "/maintenance",
            get(|| async { Err::<&'static str, _>(MaintenanceError) }),
        )
        .layer(middleware::from_fn_with_state(
            metrics,
            track_metrics::<Metrics>,
        ))
}

#[tokio::test]
async fn root_request_is_counted_once() {
    let metrics = Metrics::new().unwrap();

    let response = app(metrics.clone()).oneshot(get_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Hello, world!");
    let registry = metrics.registry();
    assert_eq!(
        counter_value(registry, &[("method", "GET"), ("path", "/"), ("code", "200")]),
        1.0
    );
    assert_eq!(
        histogram_count(registry, &[("method", "GET"), ("path", "/")]),
        1
    );
}

#[tokio::test]
async fn fail_route_is_counted_with_400() {
    let metrics = Metrics::new().unwrap();

    app(metrics.clone()).oneshot(get_request("/fail")).await.unwrap();

    assert_eq!(
        counter_value(
            metrics.registry(),
            &[("method", "GET"), ("path", "/fail"), ("code", "400")]
        ),
        1.0
    );
}

#[tokio::test]
async fn nested_route_templates_are_preserved() {
    let metrics = Metrics::new().unwrap();

    let response = app(metrics.clone())
        .oneshot(request(Method::POST, "/orders/1/items/99"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        counter_value(
            metrics.registry(),
            &[
                ("method", "POST"),
                ("path", "/orders/:order_id/items/:item_id"),
                ("code", "201"),
            ]
        ),
        1.0
    );
}

#[tokio::test]
async fn handler_error_response_is_unchanged() {
    let metrics = Metrics::new().unwrap();

    let response = app(metrics.clone())
        .oneshot(get_request("/maintenance"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_string(response).await, "down for maintenance");
    assert_eq!(
        counter_value(
            metrics.registry(),
            &[("method", "GET"), ("path", "/maintenance"), ("code", "503")]
        ),
        1.0
    );
}

#[tokio::test]
async fn path_only_latency_variant() {
    let config = MetricsConfig {
        latency_labels: LatencyLabels::Path,
        ..MetricsConfig::default()
    };
    let metrics = Metrics::from_config(&config).unwrap();
    let app = app(metrics.clone());

    app.clone().oneshot(get_request("/")).await.unwrap();
    app.oneshot(get_request("/fail")).await.unwrap();

    let registry = metrics.registry();
    assert_eq!(histogram_count(registry, &[("path", "/")]), 1);
    assert_eq!(histogram_count(registry, &[("path", "/fail")]), 1);
    assert_eq!(
        counter_value(registry, &[("method", "GET"), ("path", "/fail"), ("code", "400")]),
        1.0
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_are_not_lost() {
    let metrics = Metrics::new().unwrap();
    let app = app(metrics.clone());

    let handles = (0..1000).map(|_| {
        let app = app.clone();
        tokio::spawn(async move { app.oneshot(get_request("/fail")).await })
    });
    for result in join_all(handles).await {
        assert_eq!(result.unwrap().unwrap().status(), StatusCode::BAD_REQUEST);
    }

    assert_eq!(
        counter_value(
            metrics.registry(),
            &[("method", "GET"), ("path", "/fail"), ("code", "400")]
        ),
        1000.0
    );
}

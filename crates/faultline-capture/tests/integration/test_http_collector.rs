//! HTTP collector delivery against a wiremock server

use std::sync::Arc;
use std::time::Duration;

use faultline_capture::{
    Collector, ConfigBuilder, DeliveryError, ErrorCapture, ErrorKind, ErrorReport, HttpCollector,
    Metadata,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_report() -> ErrorReport {
    ErrorReport {
        error_type: ErrorKind::CaughtError,
        message: "boom".to_string(),
        stack: Some("at save".to_string()),
        component_stack: None,
        url: "https://app.example.com/notes".to_string(),
        user_agent: "mybrain-test/0.0".to_string(),
        session_id: "session_1700000000000_abc123def456".to_string(),
        metadata: Metadata::new(),
    }
}

#[tokio::test]
async fn submit_posts_camel_case_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/client-errors"))
        .and(body_partial_json(json!({
            "errorType": "caught_error",
            "message": "boom",
            "stack": "at save",
            "componentStack": null,
            "url": "https://app.example.com/notes",
            "userAgent": "mybrain-test/0.0",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let collector = HttpCollector::new(format!("{}/api/client-errors", server.uri()));
    collector
        .submit_client_error(sample_report())
        .await
        .expect("delivery succeeds");
}

#[tokio::test]
async fn non_success_status_becomes_delivery_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/client-errors"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let collector = HttpCollector::new(format!("{}/api/client-errors", server.uri()));
    let err = collector
        .submit_client_error(sample_report())
        .await
        .expect_err("500 must surface as an error");
    assert!(matches!(err, DeliveryError::Status(s) if s.as_u16() == 500));
}

#[tokio::test]
async fn connection_failure_becomes_transport_error() {
    // Nothing listens here.
    let collector = HttpCollector::new("http://127.0.0.1:9/api/client-errors");
    let err = collector
        .submit_client_error(sample_report())
        .await
        .expect_err("connect failure must surface as an error");
    assert!(matches!(err, DeliveryError::Transport(_)));
}

#[tokio::test]
async fn capture_pipeline_delivers_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/client-errors"))
        .and(body_partial_json(json!({
            "errorType": "warning",
            "message": "storage almost full",
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = ConfigBuilder::new()
        .collector_endpoint(format!("{}/api/client-errors", server.uri()))
        .build();
    let collector = Arc::new(HttpCollector::from_config(&config.collector).unwrap());
    let capture = ErrorCapture::new(config, collector);

    capture.capture_warning("storage almost full", Metadata::new());

    // Delivery is detached; give the spawned task time to complete before
    // the mock's expectation is verified on drop.
    for _ in 0..100 {
        if !server.received_requests().await.unwrap_or_default().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(body["sessionId"], capture.session_id());
    assert!(body["metadata"]["timestamp"].is_string());
}

#[tokio::test]
async fn rejected_delivery_does_not_block_subsequent_http_deliveries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/client-errors"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = ConfigBuilder::new()
        .collector_endpoint(format!("{}/api/client-errors", server.uri()))
        .build();
    let collector = Arc::new(HttpCollector::from_config(&config.collector).unwrap());
    let capture = ErrorCapture::new(config, collector);

    capture.capture_error("first failing delivery", Metadata::new());
    capture.capture_error("second distinct delivery", Metadata::new());

    for _ in 0..100 {
        if server.received_requests().await.unwrap_or_default().len() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

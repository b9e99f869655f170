//! End-to-end pipeline behavior through the public API

use std::time::Duration;

use faultline_capture::{ErrorCapture, ErrorKind, Metadata};
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;

use crate::common::{
    capture_with_recorder, short_window_config, sleep_past_window, wait_for_reports,
    RecordingCollector,
};

#[tokio::test]
async fn repeated_error_within_window_is_delivered_once() {
    let (capture, collector) = capture_with_recorder();

    capture.capture_error("Repeated error", Metadata::new());
    capture.capture_error("Repeated error", Metadata::new());

    wait_for_reports(&collector, 1).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(collector.reports().len(), 1);
}

#[tokio::test]
async fn repeated_error_after_window_is_delivered_again() {
    let (capture, collector) = capture_with_recorder();

    capture.capture_error("Repeated error", Metadata::new());
    capture.capture_error("Repeated error", Metadata::new());
    sleep_past_window().await;
    capture.capture_error("Repeated error", Metadata::new());

    let reports = wait_for_reports(&collector, 2).await;
    assert_eq!(reports.len(), 2);
}

#[tokio::test]
async fn same_message_different_kind_is_not_cross_suppressed() {
    let (capture, collector) = capture_with_recorder();

    capture.capture_error("x", Metadata::new());
    capture.capture_warning("x", Metadata::new());

    let reports = wait_for_reports(&collector, 2).await;
    let kinds: Vec<ErrorKind> = reports.iter().map(|r| r.error_type).collect();
    assert!(kinds.contains(&ErrorKind::CaughtError));
    assert!(kinds.contains(&ErrorKind::Warning));
}

#[tokio::test]
async fn session_id_is_stable_and_well_formed() {
    let (capture, collector) = capture_with_recorder();

    capture.capture_error("first", Metadata::new());
    capture.capture_warning("second", Metadata::new());

    let reports = wait_for_reports(&collector, 2).await;
    assert_eq!(reports[0].session_id, reports[1].session_id);
    assert_eq!(reports[0].session_id, capture.session_id());

    let parts: Vec<&str> = reports[0].session_id.splitn(3, '_').collect();
    assert_eq!(parts[0], "session");
    assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
    assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn delivery_failure_is_invisible_to_callers_and_later_reports() {
    let collector = RecordingCollector::failing();
    let capture = ErrorCapture::new(crate::common::short_window_config(), collector.clone());

    // Must not panic even though every delivery is rejected.
    capture.capture_error("doomed report", Metadata::new());
    wait_for_reports(&collector, 1).await;

    capture.capture_error("a different, later report", Metadata::new());
    let reports = wait_for_reports(&collector, 2).await;
    assert_eq!(reports[1].message, "a different, later report");
}

#[tokio::test]
async fn object_with_null_message_is_delivered_with_string_message() {
    let (capture, collector) = capture_with_recorder();

    capture.capture_error(json!({ "message": null }), Metadata::new());

    let reports = wait_for_reports(&collector, 1).await;
    assert_eq!(reports[0].error_type, ErrorKind::CaughtError);
    // Message is always a string, coerced from the object.
    assert!(reports[0].message.contains("message"));
}

#[tokio::test]
async fn report_carries_client_identity_and_timestamp() {
    let (capture, collector) = capture_with_recorder();

    let mut context = Metadata::new();
    context.insert("taskId".to_string(), json!("task-42"));
    context.insert("view".to_string(), json!("board"));
    capture.capture_error("drag failed", context);

    let reports = wait_for_reports(&collector, 1).await;
    let report = &reports[0];
    assert_eq!(report.url, "https://app.example.com/tasks");
    assert_eq!(report.user_agent, "mybrain-test/0.0");

    // Caller metadata keeps insertion order; timestamp is appended last.
    let keys: Vec<&String> = report.metadata.keys().collect();
    assert_eq!(keys, ["taskId", "view", "timestamp"]);
    let timestamp = report.metadata["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn watched_task_failure_flows_through_whole_pipeline() {
    let (capture, collector) = capture_with_recorder();

    capture
        .spawn_watched(async { Err::<(), anyhow::Error>(anyhow::anyhow!("index rebuild failed")) })
        .await
        .unwrap();

    let reports = wait_for_reports(&collector, 1).await;
    assert_eq!(reports[0].error_type, ErrorKind::UnhandledRejection);
    assert_eq!(reports[0].message, "index rebuild failed");
    assert_eq!(reports[0].metadata["type"], "Error");
}

#[tokio::test]
async fn signature_layer_reports_framework_diagnostics_end_to_end() {
    let (capture, collector) = capture_with_recorder();
    let subscriber = tracing_subscriber::registry().with(capture.layer());

    tracing::subscriber::with_default(subscriber, || {
        tracing::error!("Warning: Encountered two children with the same key, `note-7`.");
        tracing::error!("unrelated diagnostic output");
    });

    let reports = wait_for_reports(&collector, 1).await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].error_type, ErrorKind::ReactError);
}

#[tokio::test]
async fn init_error_capture_is_safe_to_call_repeatedly() {
    let collector = RecordingCollector::new();
    let first = faultline_capture::init_error_capture(short_window_config(), collector.clone());
    let second = faultline_capture::init_error_capture(short_window_config(), collector.clone());

    // Hook installation is one-shot, but both handles report normally.
    first.capture_warning("from first handle", Metadata::new());
    second.capture_warning("from second handle", Metadata::new());
    wait_for_reports(&collector, 2).await;
}

#[tokio::test]
async fn capture_error_accepts_arbitrary_value_shapes() {
    let (capture, collector) = capture_with_recorder();

    capture.capture_error(json!(null), Metadata::new());
    capture.capture_error(json!(417), Metadata::new());
    capture.capture_error("", Metadata::new());

    let reports = wait_for_reports(&collector, 3).await;
    let messages: Vec<&str> = reports.iter().map(|r| r.message.as_str()).collect();
    assert!(messages.contains(&"null"));
    assert!(messages.contains(&"417"));
    assert!(messages.contains(&""));
}

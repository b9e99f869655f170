//! Report assembly and fire-and-forget delivery
//!
//! The reporter owns the debounce gate and the session identity. A report
//! that passes the gate is assembled into an [`ErrorReport`] and handed to
//! the collector on a detached task; the delivery result is discarded on
//! the success branch and logged on the failure branch. Nothing on this
//! path ever reaches the code that triggered the capture.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use faultline_core::{Config, ErrorKind, ErrorReport, Metadata, NormalizedError};
use serde_json::Value;
use tracing::{debug, warn};

use crate::collector::Collector;
use crate::debounce::DebounceGate;
use crate::session::SessionId;

/// Optional trace and caller context accompanying one report.
#[derive(Debug, Default)]
pub struct ReportDetails {
    /// Trace used when the normalized value carries none.
    pub stack: Option<String>,
    /// UI-tree context, when the trigger had any.
    pub component_stack: Option<String>,
    /// Caller-supplied key/value context.
    pub metadata: Metadata,
}

impl ReportDetails {
    pub fn with_metadata(metadata: Metadata) -> Self {
        Self {
            metadata,
            ..Self::default()
        }
    }
}

/// Assembles reports and performs detached delivery.
pub(crate) struct Reporter {
    session: SessionId,
    page_url: String,
    user_agent: String,
    gate: DebounceGate,
    collector: Arc<dyn Collector>,
    /// Runtime the delivery tasks are spawned on. `None` when the capture
    /// handle was built outside a Tokio context; reports are then logged
    /// and dropped instead of delivered.
    runtime: Option<tokio::runtime::Handle>,
}

impl Reporter {
    pub fn new(config: &Config, collector: Arc<dyn Collector>) -> Self {
        Self {
            session: SessionId::generate(),
            page_url: config.client.page_url.clone(),
            user_agent: config.client.user_agent.clone(),
            gate: DebounceGate::new(
                Duration::from_millis(config.debounce.window_ms),
                config.debounce.max_tracked_keys,
            ),
            collector,
            runtime: tokio::runtime::Handle::try_current().ok(),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session
    }

    /// Reports one occurrence. Consults the debounce gate first; a
    /// suppressed occurrence has no observable effect beyond a debug line.
    pub fn report(&self, kind: ErrorKind, error: NormalizedError, details: ReportDetails) {
        let key = format!("{}:{}", kind.as_str(), error.message);
        if !self.gate.should_report(&key) {
            debug!(error_type = kind.as_str(), "suppressed near-duplicate report");
            return;
        }

        let mut metadata = details.metadata;
        metadata.insert(
            "timestamp".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );

        let report = ErrorReport {
            error_type: kind,
            message: error.message,
            stack: error.stack.or(details.stack),
            component_stack: details.component_stack,
            url: self.page_url.clone(),
            user_agent: self.user_agent.clone(),
            session_id: self.session.as_str().to_string(),
            metadata,
        };

        let Some(runtime) = &self.runtime else {
            warn!(
                error_type = report.error_type.as_str(),
                "no async runtime available, dropping error report"
            );
            return;
        };

        let collector = Arc::clone(&self.collector);
        runtime.spawn(async move {
            // Failure stays on this task; the triggering path never sees it.
            if let Err(err) = collector.submit_client_error(report).await {
                warn!(error = %err, "failed to deliver error report");
            }
        });
    }
}

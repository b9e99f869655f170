//! Faultline Capture - client-side error capture pipeline
//!
//! Intercepts otherwise-invisible runtime failures (panics, failed
//! background tasks, severe framework diagnostics) as well as explicitly
//! captured errors, normalizes them, suppresses near-duplicates, and
//! forwards a correlated record of each to a remote collector. The
//! reporting path never destabilizes the host: every failure inside the
//! pipeline ends as a local log line, and delivery is fire-and-forget.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use faultline_capture::{init_error_capture, HttpCollector};
//! use faultline_core::{Config, Metadata};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::default();
//! let collector = Arc::new(HttpCollector::from_config(&config.collector)?);
//! let capture = init_error_capture(config, collector);
//!
//! if let Err(err) = std::fs::read_to_string("notes.db") {
//!     capture.capture_error(anyhow::Error::new(err), Metadata::new());
//! }
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod debounce;
mod hooks;
pub mod layer;
mod reporter;
pub mod session;

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

pub use collector::{Collector, DeliveryError, HttpCollector};
pub use faultline_core::{
    normalize, CapturedValue, Config, ConfigBuilder, ErrorKind, ErrorReport, Metadata,
    NormalizedError,
};
pub use layer::SignatureLayer;
pub use reporter::ReportDetails;

use reporter::Reporter;

/// Characters kept from a matched diagnostic message; the full text moves
/// to metadata when this limit truncates it.
const DIAGNOSTIC_MESSAGE_LIMIT: usize = 500;

struct CaptureInner {
    reporter: Reporter,
    signatures: Vec<String>,
}

/// The capture pipeline handle.
///
/// One instance is constructed at startup and threaded (or cloned) into
/// every call site; it owns the session identity, the debounce state, and
/// the collector. Clones share all of it.
#[derive(Clone)]
pub struct ErrorCapture {
    inner: Arc<CaptureInner>,
}

impl ErrorCapture {
    /// Builds a capture handle. Construct inside the async runtime so
    /// delivery tasks have somewhere to run.
    pub fn new(config: Config, collector: Arc<dyn Collector>) -> Self {
        let reporter = Reporter::new(&config, collector);
        Self {
            inner: Arc::new(CaptureInner {
                reporter,
                signatures: config.signatures.patterns,
            }),
        }
    }

    /// The correlation token attached to every report from this handle.
    pub fn session_id(&self) -> &str {
        self.inner.reporter.session_id().as_str()
    }

    /// Reports an error a call site caught itself. Accepts anything
    /// convertible to a [`CapturedValue`]; never panics regardless of the
    /// value's shape.
    pub fn capture_error(&self, error: impl Into<CapturedValue>, context: Metadata) {
        let normalized = normalize(&error.into());
        self.inner.reporter.report(
            ErrorKind::CaughtError,
            normalized,
            ReportDetails::with_metadata(context),
        );
    }

    /// Reports a non-fatal but notable condition, message verbatim.
    pub fn capture_warning(&self, message: impl Into<String>, context: Metadata) {
        self.inner.reporter.report(
            ErrorKind::Warning,
            NormalizedError::new(message),
            ReportDetails::with_metadata(context),
        );
    }

    /// Installs the implicit capture points (currently the process-wide
    /// panic hook). One-shot per process; repeated calls are no-ops.
    pub fn install_hooks(&self) {
        hooks::install(self);
    }

    /// A `tracing_subscriber` layer that scans WARN/ERROR diagnostics for
    /// the configured severe-framework signatures. Compose it into the
    /// host's registry next to its other layers.
    pub fn layer(&self) -> SignatureLayer {
        SignatureLayer::new(self.clone())
    }

    /// Matches one diagnostic line against the configured signatures,
    /// reporting a framework error on a hit. Exposed for hosts without a
    /// tracing registry; [`SignatureLayer`] calls it per event.
    pub fn scan_diagnostic(&self, message: &str) {
        let Some(signature) = self
            .inner
            .signatures
            .iter()
            .find(|sig| message.contains(sig.as_str()))
        else {
            return;
        };
        debug!(signature = signature.as_str(), "matched severe diagnostic signature");

        let truncated: String = message.chars().take(DIAGNOSTIC_MESSAGE_LIMIT).collect();
        let mut metadata = Metadata::new();
        if truncated.len() < message.len() {
            metadata.insert("fullMessage".to_string(), Value::String(message.to_string()));
        }
        self.inner.reporter.report(
            ErrorKind::ReactError,
            NormalizedError::new(truncated),
            ReportDetails::with_metadata(metadata),
        );
    }

    pub(crate) fn reporter(&self) -> &Reporter {
        &self.inner.reporter
    }
}

/// Builds the capture handle and installs the implicit hooks in one step.
///
/// Safe to call more than once: hook installation happens exactly once per
/// process. Hosts wanting a single session construct one handle at startup
/// and clone it.
pub fn init_error_capture(config: Config, collector: Arc<dyn Collector>) -> ErrorCapture {
    let capture = ErrorCapture::new(config, collector);
    capture.install_hooks();
    capture
}

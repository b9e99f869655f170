//! Wire-level error report record
//!
//! Defines the classification taxonomy and the JSON shape submitted to the
//! remote collector. Reports are constructed transiently for a single
//! delivery attempt and never retained afterwards.

use serde::{Deserialize, Serialize};

/// Caller-supplied key/value context attached to a report.
///
/// Insertion order is preserved on the wire (`serde_json` with
/// `preserve_order`); the reporter appends a `timestamp` entry last.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Classifies the origin of a captured error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// An exception that escaped to the top level (panic).
    UncaughtError,
    /// A background task that failed with nobody awaiting the result.
    UnhandledRejection,
    /// A severe UI-framework defect signature seen in diagnostic output.
    ///
    /// The wire value is kept for collector compatibility with the
    /// browser client; the signature list itself is configuration.
    ReactError,
    /// Explicitly reported from a catch site.
    CaughtError,
    /// Explicitly reported non-fatal condition.
    Warning,
}

impl ErrorKind {
    /// The wire string for this kind, also used in debounce keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UncaughtError => "uncaught_error",
            ErrorKind::UnhandledRejection => "unhandled_rejection",
            ErrorKind::ReactError => "react_error",
            ErrorKind::CaughtError => "caught_error",
            ErrorKind::Warning => "warning",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single client error report, the unit sent to the collector.
///
/// `stack` and `component_stack` serialize as `null` when absent, matching
/// the collector's expected shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub error_type: ErrorKind,
    pub message: String,
    pub stack: Option<String>,
    pub component_stack: Option<String>,
    pub url: String,
    pub user_agent: String,
    pub session_id: String,
    pub metadata: Metadata,
}

impl ErrorReport {
    /// The debounce key for this report: `"{errorType}:{message}"`.
    pub fn debounce_key(&self) -> String {
        format!("{}:{}", self.error_type.as_str(), self.message)
    }
}

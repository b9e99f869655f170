//! Canonicalization of arbitrary error values
//!
//! Call sites hand the capture pipeline whatever they have: a real error,
//! a string, a dynamic JSON value from the embedding layer, or nothing at
//! all. `normalize` turns any of these into a canonical
//! `{message, stack?}` pair and never fails.

use serde_json::Value;

/// Fallback message when a value cannot be rendered at all.
const UNRENDERABLE: &str = "[unserializable error value]";

/// An arbitrary value passed to the capture pipeline.
#[derive(Debug, Clone)]
pub enum CapturedValue {
    /// No value at all (e.g. a rejection with no reason).
    Absent,
    /// A dynamic value from the embedding layer.
    Value(Value),
    /// An already-shaped error with a message and optional trace.
    Exception {
        message: String,
        stack: Option<String>,
    },
}

impl CapturedValue {
    /// Builds a value from a standard error, collecting its `source()`
    /// chain into the stack field.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        CapturedValue::Exception {
            message: err.to_string(),
            stack: if chain.is_empty() {
                None
            } else {
                Some(chain.join("\n"))
            },
        }
    }
}

impl From<&str> for CapturedValue {
    fn from(s: &str) -> Self {
        CapturedValue::Value(Value::String(s.to_string()))
    }
}

impl From<String> for CapturedValue {
    fn from(s: String) -> Self {
        CapturedValue::Value(Value::String(s))
    }
}

impl From<Value> for CapturedValue {
    fn from(v: Value) -> Self {
        CapturedValue::Value(v)
    }
}

impl From<Option<Value>> for CapturedValue {
    fn from(v: Option<Value>) -> Self {
        match v {
            Some(v) => CapturedValue::Value(v),
            None => CapturedValue::Absent,
        }
    }
}

impl From<anyhow::Error> for CapturedValue {
    fn from(err: anyhow::Error) -> Self {
        let chain: Vec<String> = err
            .chain()
            .skip(1)
            .map(|cause| format!("caused by: {cause}"))
            .collect();
        CapturedValue::Exception {
            message: err.to_string(),
            stack: if chain.is_empty() {
                None
            } else {
                Some(chain.join("\n"))
            },
        }
    }
}

/// The canonical error record produced from an arbitrary value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedError {
    pub message: String,
    pub stack: Option<String>,
}

impl NormalizedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }
}

/// Converts an arbitrary captured value into a canonical `{message, stack?}`
/// pair.
///
/// Never panics; a value that cannot be rendered degrades to a fixed-form
/// string instead.
pub fn normalize(value: &CapturedValue) -> NormalizedError {
    match value {
        CapturedValue::Absent => NormalizedError::new("undefined"),
        CapturedValue::Exception { message, stack } => NormalizedError {
            message: message.clone(),
            stack: stack.clone(),
        },
        CapturedValue::Value(v) => normalize_value(v),
    }
}

fn normalize_value(value: &Value) -> NormalizedError {
    match value {
        Value::Null => NormalizedError::new("null"),
        // Empty string stays empty string.
        Value::String(s) => NormalizedError::new(s.clone()),
        Value::Number(n) => NormalizedError::new(n.to_string()),
        Value::Bool(b) => NormalizedError::new(b.to_string()),
        Value::Object(map) => {
            if let Some(Value::String(message)) = map.get("message") {
                let stack = map
                    .get("stack")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                return NormalizedError {
                    message: message.clone(),
                    stack,
                };
            }
            NormalizedError::new(render(value))
        }
        Value::Array(_) => NormalizedError::new(render(value)),
    }
}

/// Best-effort compact JSON rendering of a value.
fn render(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| UNRENDERABLE.to_string())
}

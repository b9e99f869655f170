//! Diagnostic-log signature scanning
//!
//! A `tracing_subscriber` layer the host composes into its registry next
//! to its other layers. It observes WARN and ERROR events, renders their
//! fields to a single line the way a console sink would, and hands the
//! result to [`ErrorCapture::scan_diagnostic`] for signature matching.
//! Composing a layer chains to the host's existing sinks instead of
//! replacing them.

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::ErrorCapture;

/// Watches diagnostic events for configured severe-framework signatures.
pub struct SignatureLayer {
    capture: ErrorCapture,
}

impl SignatureLayer {
    pub(crate) fn new(capture: ErrorCapture) -> Self {
        Self { capture }
    }
}

impl<S: Subscriber> Layer<S> for SignatureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() > Level::WARN {
            return;
        }
        // The reporter logs through tracing too; never scan our own
        // diagnostics.
        if metadata.target().starts_with("faultline") {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.capture.scan_diagnostic(&visitor.rendered());
    }
}

/// Renders an event's fields to one line: the `message` field first,
/// remaining fields appended as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn rendered(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.join(" ")
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

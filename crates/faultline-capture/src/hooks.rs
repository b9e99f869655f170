//! Implicit capture points
//!
//! Wires the pipeline to failures nobody reports explicitly: panics that
//! reach the top of a thread, and background tasks that fail with no one
//! awaiting the result. Hook installation is one-shot per process; the
//! panic hook chains to the previously installed hook so default platform
//! handling (stderr output, unwinding) is preserved.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};

use faultline_core::{ErrorKind, Metadata, NormalizedError};
use futures_util::FutureExt;
use serde_json::json;

use crate::reporter::ReportDetails;
use crate::ErrorCapture;

/// Reported when a task failure carries no usable message.
const REJECTION_PLACEHOLDER: &str = "Unhandled rejection";

static HOOKS_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Installs the process-wide panic hook, exactly once regardless of how
/// many times it is called.
pub(crate) fn install(capture: &ErrorCapture) {
    if HOOKS_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let capture = capture.clone();
    let previous_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        // Reporting must never turn one panic into an abort.
        let reported = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };

            let mut metadata = Metadata::new();
            if let Some(location) = panic_info.location() {
                metadata.insert("source".to_string(), json!(location.file()));
                metadata.insert("lineno".to_string(), json!(location.line()));
                metadata.insert("colno".to_string(), json!(location.column()));
            }

            let backtrace = std::backtrace::Backtrace::force_capture().to_string();

            capture.reporter().report(
                ErrorKind::UncaughtError,
                NormalizedError {
                    message,
                    stack: Some(backtrace),
                },
                ReportDetails::with_metadata(metadata),
            );
        }));
        if reported.is_err() {
            eprintln!("faultline: failed to report a panic");
        }

        // Call the previous panic hook
        previous_hook(panic_info);
    }));
}

#[cfg(test)]
pub(crate) fn hooks_installed() -> bool {
    HOOKS_INSTALLED.load(Ordering::SeqCst)
}

impl ErrorCapture {
    /// Spawns a fallible background task whose failure nobody else will
    /// observe, reporting an `unhandled_rejection` when it resolves to
    /// `Err` or panics. The returned handle never yields an error.
    pub fn spawn_watched<F, E>(&self, task: F) -> tokio::task::JoinHandle<()>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let capture = self.clone();
        tokio::spawn(async move {
            match AssertUnwindSafe(task).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    capture.report_rejection(err.to_string(), short_type_name::<E>());
                }
                Err(payload) => {
                    capture.report_rejection(panic_payload_message(payload.as_ref()), "panic");
                }
            }
        })
    }

    fn report_rejection(&self, message: String, type_name: &str) {
        let message = if message.is_empty() {
            REJECTION_PLACEHOLDER.to_string()
        } else {
            message
        };
        let mut metadata = Metadata::new();
        metadata.insert("type".to_string(), json!(type_name));
        self.reporter().report(
            ErrorKind::UnhandledRejection,
            NormalizedError::new(message),
            ReportDetails::with_metadata(metadata),
        );
    }
}

/// Type name of the failure, without its module path.
fn short_type_name<E>() -> &'static str {
    std::any::type_name::<E>()
        .rsplit("::")
        .next()
        .unwrap_or("Unknown")
}

fn panic_payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

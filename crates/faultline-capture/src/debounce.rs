//! Near-duplicate suppression
//!
//! A sliding window per `"{errorType}:{message}"` key decides whether an
//! occurrence is reported or suppressed. The key table is bounded: once it
//! grows past a configured size, stale entries are purged opportunistically
//! on the next insert.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Decides whether an occurrence of a classification key should be
/// reported or suppressed as a near-duplicate.
///
/// The decision and the state update happen under one lock, so for a
/// single key decisions are made strictly in call order even on a
/// multi-threaded host.
pub struct DebounceGate {
    window: Duration,
    max_tracked: usize,
    seen: Mutex<HashMap<String, Instant>>,
}

impl DebounceGate {
    pub fn new(window: Duration, max_tracked: usize) -> Self {
        Self {
            window,
            max_tracked,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `true` if this occurrence should be reported, recording the
    /// attempt time as a side effect. Returns `false` when the same key was
    /// reported within the window.
    pub fn should_report(&self, key: &str) -> bool {
        let now = Instant::now();
        // A poisoned lock still holds valid timestamps.
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(prior) = seen.get(key) {
            if now.duration_since(*prior) < self.window {
                return false;
            }
        }
        seen.insert(key.to_string(), now);

        // Advisory cleanup only; the decision rule above stays correct
        // without it.
        if seen.len() > self.max_tracked {
            let window = self.window;
            seen.retain(|_, recorded| now.duration_since(*recorded) < window);
        }

        true
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

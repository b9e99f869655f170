//! Session correlation identity
//!
//! One token per capture handle, attached to every report so the
//! collector can group all reports from a single run.

use chrono::Utc;
use uuid::Uuid;

/// Length of the random suffix appended to the session id.
const TOKEN_LEN: usize = 12;

/// A correlation token of the form `session_{millis}_{randomToken}`.
///
/// Held for the life of the process, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh session id.
    pub fn generate() -> Self {
        let token = Uuid::new_v4().simple().to_string();
        Self(format!(
            "session_{}_{}",
            Utc::now().timestamp_millis(),
            &token[..TOKEN_LEN]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

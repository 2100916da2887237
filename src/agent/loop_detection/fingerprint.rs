//! Progress fingerprints over tool output.

use crate::agent::tool::ToolResult;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Digest of a call's observable output.
///
/// Pure function of the result payload: no counters, no clock.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ProgressFingerprint(String);

impl ProgressFingerprint {
    /// Fingerprint a tool result.
    ///
    /// Covers every text content item plus the listed `details` fields.
    /// Missing detail fields contribute an empty component.
    #[must_use]
    pub fn of_result(result: &ToolResult, detail_fields: &[String]) -> Self {
        let mut hasher = Sha256::new();
        for text in result.content.iter().filter_map(|item| item.as_text()) {
            hasher.update(b"text:");
            hasher.update(text.as_bytes());
            hasher.update(b"\n");
        }
        for field in detail_fields {
            hasher.update(field.as_bytes());
            hasher.update(b"=");
            match result.details.get(field) {
                Some(Value::String(text)) => hasher.update(text.as_bytes()),
                Some(Value::Null) | None => {}
                Some(other) => hasher.update(other.to_string().as_bytes()),
            }
            hasher.update(b"\n");
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Fingerprint a tool failure by its message.
    #[must_use]
    pub fn of_error(message: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"error:");
        hasher.update(message.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }
}

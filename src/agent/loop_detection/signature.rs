//! Call signatures for repetition tracking.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// Grouping key of a call within a session: tool name plus normalized parameters.
///
/// Two parameter mappings that differ only in key order produce the same
/// signature.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CallSignature(String);

impl CallSignature {
    /// Derive the signature of a call.
    #[must_use]
    pub fn new(tool_name: &str, params: &Map<String, Value>) -> Self {
        // serde_json maps are key-sorted without `preserve_order`, so the
        // encoding is canonical.
        let canonical = Value::Object(params.clone()).to_string();

        let mut hasher = Sha256::new();
        hasher.update(tool_name.to_lowercase().as_bytes());
        hasher.update(b":");
        hasher.update(canonical.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Hex digest of the signature.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short prefix is enough to tell signatures apart in logs.
        f.write_str(self.0.get(..12).unwrap_or(self.0.as_str()))
    }
}

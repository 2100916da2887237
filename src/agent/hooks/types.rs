//! Hook Types - requests, context, and decisions for before-call hooks

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Payload handed to before-call hooks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeforeToolCallRequest {
    /// Lowercased tool name
    pub tool_name: String,
    /// Normalized call parameters (always a mapping)
    pub params: Map<String, Value>,
}

/// Context provided to hooks alongside the request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookContext {
    /// Lowercased tool name
    pub tool_name: String,
    /// Calling agent, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    /// Session the call belongs to, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
}

/// Decision returned by a hook
///
/// Consumed once per call and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookDecision {
    /// Parameters to merge over the normalized call parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    /// Veto the call
    #[serde(default)]
    pub block: bool,
    /// Human-readable reason for the veto
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

impl HookDecision {
    /// Decision that vetoes the call.
    #[must_use]
    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            params: None,
            block: true,
            block_reason: Some(reason.into()),
        }
    }

    /// Decision that rewrites parameters.
    #[must_use]
    pub fn with_params(params: Map<String, Value>) -> Self {
        Self {
            params: Some(params),
            block: false,
            block_reason: None,
        }
    }
}

/// Errors raised while running hooks
#[derive(Debug, Error)]
pub enum HookError {
    /// A hook failed while handling a call
    #[error("Hook '{hook}' failed: {reason}")]
    Failed {
        /// Name of the failing hook
        hook: String,
        /// Failure description
        reason: String,
    },
    /// Any other runner failure
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

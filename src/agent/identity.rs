//! Agent session identity types.

use std::fmt;

/// Opaque key scoping loop-detection state to one agent session.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    /// Build a key from an agent identity and a session identity.
    #[must_use]
    pub fn for_agent(agent_id: &str, session_id: &str) -> Self {
        Self(format!("agent:{agent_id}:{session_id}"))
    }

    /// Return the raw key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Call context a tool is wrapped with.
///
/// Both fields are optional: without a session key the interceptor still
/// runs hooks but skips loop detection.
#[derive(Clone, Debug, Default)]
pub struct ToolCallContext {
    /// Identity of the agent issuing the calls
    pub agent_id: Option<String>,
    /// Session the calls belong to
    pub session_key: Option<SessionKey>,
}

impl ToolCallContext {
    /// Context bound to an agent session.
    #[must_use]
    pub fn new(agent_id: impl Into<String>, session_key: impl Into<SessionKey>) -> Self {
        Self {
            agent_id: Some(agent_id.into()),
            session_key: Some(session_key.into()),
        }
    }
}

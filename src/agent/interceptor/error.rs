//! Failures surfaced by the tool interceptor.
//!
//! Messages are matched by downstream tooling: poll-loop trips contain
//! `CRITICAL`, global trips contain `global circuit breaker`, and blocks
//! carry the hook's reason verbatim.

use crate::agent::loop_detection::LoopTrip;
use thiserror::Error;

/// Errors raised in place of running the underlying tool
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolCallError {
    /// A before-call hook vetoed the call
    #[error("Tool call `{tool_name}` blocked: {reason}")]
    Blocked {
        /// Lowercased tool name
        tool_name: String,
        /// Reason given by the hook, or the default block message
        reason: String,
    },
    /// A poll-style call kept returning the same output
    #[error(
        "CRITICAL: poll loop detected for `{tool_name}`: {count} consecutive calls with identical arguments and no progress. Stop polling and try a different approach."
    )]
    CriticalPollLoop {
        /// Lowercased tool name
        tool_name: String,
        /// Consecutive no-progress calls
        count: usize,
    },
    /// Generic calls in the session kept returning the same output
    #[error(
        "Tool call `{tool_name}` refused: global circuit breaker tripped after {count} consecutive tool calls without progress in this session."
    )]
    GlobalCircuitBreaker {
        /// Lowercased tool name
        tool_name: String,
        /// Consecutive no-progress generic calls in the session
        count: usize,
    },
}

impl ToolCallError {
    /// Failure for a call refused because of an earlier breaker trip.
    #[must_use]
    pub fn from_trip(tool_name: &str, trip: LoopTrip) -> Self {
        match trip {
            LoopTrip::CriticalPollLoop { count } => Self::CriticalPollLoop {
                tool_name: tool_name.to_string(),
                count,
            },
            LoopTrip::GlobalCircuitBreaker { count } => Self::GlobalCircuitBreaker {
                tool_name: tool_name.to_string(),
                count,
            },
        }
    }

    /// Whether this failure comes from loop detection rather than a hook.
    #[must_use]
    pub const fn is_loop(&self) -> bool {
        matches!(
            self,
            Self::CriticalPollLoop { .. } | Self::GlobalCircuitBreaker { .. }
        )
    }
}

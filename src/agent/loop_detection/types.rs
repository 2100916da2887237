//! Types for loop detection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Loop-detection classification of a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolClass {
    /// Polls the status of a long-running operation; trips fast
    PollStyle,
    /// Any other tool; only the session-wide breaker applies
    Generic,
}

/// Which circuit breaker a loop tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopTrip {
    /// A poll-style signature repeated without progress
    CriticalPollLoop {
        /// Consecutive no-progress calls on the signature
        count: usize,
    },
    /// Generic calls across the session repeated without progress
    GlobalCircuitBreaker {
        /// Consecutive no-progress generic calls in the session
        count: usize,
    },
}

/// Pre-call verdict for a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopVerdict {
    /// Proceed with the call
    Allow,
    /// A breaker tripped on an earlier call; refuse this one
    Block(LoopTrip),
}

/// Errors produced by loop detection components.
#[derive(Debug, Error)]
pub enum LoopDetectionError {
    /// Thresholds violate `0 < warning <= critical < global`.
    #[error(
        "Invalid loop thresholds: warning={warning}, critical={critical}, global={global}"
    )]
    InvalidThresholds {
        /// Warning threshold
        warning: usize,
        /// Critical threshold
        critical: usize,
        /// Global circuit breaker threshold
        global: usize,
    },
}

//! Configuration constants
//!
//! Thresholds used by loop detection and default messages surfaced by the
//! tool interceptor. Runtime overrides live in
//! [`LoopDetectionConfig`](crate::agent::loop_detection::LoopDetectionConfig).

/// Consecutive no-progress calls on one signature before a warning is logged
pub const WARNING_THRESHOLD: usize = 10;

/// Consecutive no-progress calls on a poll-style signature that trip the poll-loop breaker
pub const CRITICAL_THRESHOLD: usize = 20;

/// Consecutive no-progress generic calls in a session that trip the global breaker
pub const GLOBAL_CIRCUIT_BREAKER_THRESHOLD: usize = 30;

/// Distinct call signatures remembered per session before the stalest is evicted
pub const MAX_TRACKED_SIGNATURES: usize = 512;

/// Failure message used when a hook blocks a call without giving a reason
pub const DEFAULT_BLOCK_REASON: &str = "Tool call blocked by before_tool_call hook";

const _: () = assert!(CRITICAL_THRESHOLD < GLOBAL_CIRCUIT_BREAKER_THRESHOLD);
const _: () = assert!(WARNING_THRESHOLD <= CRITICAL_THRESHOLD);

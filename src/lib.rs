#![deny(missing_docs)]
//! Oxide tool guard.
//!
//! Wraps agent tools so every call passes through before-call hooks and
//! per-session loop detection before the underlying tool runs.

/// Agent-side tool plumbing: hooks, loop detection, interception, adapters.
pub mod agent;
/// Crate-wide thresholds and default messages.
pub mod config;
/// Tool-calling wire shapes shared with the LLM layer.
pub mod llm;

pub use agent::{
    AgentTool, HookRunner, InterceptedTool, LoopDetector, ToolCallContext, ToolCallError,
    ToolInterceptor, ToolResult,
};

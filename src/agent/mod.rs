//! Agent tool plumbing
//!
//! This module provides the pieces that sit between an agent and its tools:
//! - Before-call hooks that can rewrite or veto a call
//! - Per-session loop detection with two circuit breakers
//! - The tool interceptor that runs both around every call
//! - Adapters and a registry that expose each wrapped tool exactly once

/// Definition adapters for the internal and client calling conventions
pub mod adapters;
/// Hook system for intercepting tool calls
pub mod hooks;
/// Session identity and call context
pub mod identity;
/// Tool call interception pipeline
pub mod interceptor;
/// Loop detection subsystem
pub mod loop_detection;
/// Registry of intercepted tools
pub mod registry;
/// Agent tool contract
pub mod tool;

pub use adapters::{AgentToolAdapter, ClientToolAdapter, ClientToolDefinition};
pub use hooks::{
    BeforeToolCallRequest, Hook, HookContext, HookDecision, HookError, HookRegistry, HookRunner,
};
pub use identity::{SessionKey, ToolCallContext};
pub use interceptor::{InterceptedTool, ToolCallError, ToolInterceptor};
pub use loop_detection::{LoopDetectionConfig, LoopDetector, LoopTrip, ToolClass};
pub use registry::ToolRegistry;
pub use tool::{AgentTool, ContentItem, ToolMetadata, ToolResult, ToolUpdateSender};

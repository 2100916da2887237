//! Agent Hooks Module
//!
//! Before-call hooks that can inspect, rewrite, or veto a tool call before
//! the tool runs. The tool interceptor consumes hooks only through the
//! [`HookRunner`] contract; [`HookRegistry`] is the in-process runner.

pub mod registry;
pub mod types;

#[cfg(test)]
pub use registry::MockHookRunner;
pub use registry::{Hook, HookRegistry, HookRunner};
pub use types::{BeforeToolCallRequest, HookContext, HookDecision, HookError};

//! Hook Registry - manages and executes before-call hooks
//!
//! Provides the [`HookRunner`] contract consumed by the tool interceptor,
//! the `Hook` trait, and `HookRegistry`, an ordered chain of hooks that
//! implements the runner.

use super::types::{BeforeToolCallRequest, HookContext, HookDecision, HookError};
use async_trait::async_trait;
use serde_json::Map;
use tracing::{debug, info, warn};

/// Contract the tool interceptor uses to consult hooks
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HookRunner: Send + Sync {
    /// Whether any before-call hook is registered. Pure, no side effects.
    fn has_hooks(&self) -> bool;

    /// Run the before-call hook chain
    ///
    /// Returns `Ok(None)` when no hook has an opinion about the call.
    async fn run_before_tool_call(
        &self,
        request: &BeforeToolCallRequest,
        context: &HookContext,
    ) -> Result<Option<HookDecision>, HookError>;
}

/// Trait for implementing hooks
#[async_trait]
pub trait Hook: Send + Sync {
    /// Name of the hook for logging and debugging
    fn name(&self) -> &'static str;

    /// Inspect a tool call before it runs
    ///
    /// Hooks should return `Ok(None)` if they don't need to modify the call.
    async fn before_tool_call(
        &self,
        request: &BeforeToolCallRequest,
        context: &HookContext,
    ) -> Result<Option<HookDecision>, HookError>;
}

/// Registry that manages multiple hooks
pub struct HookRegistry {
    hooks: Vec<Box<dyn Hook>>,
}

impl HookRegistry {
    /// Create a new empty hook registry
    #[must_use]
    pub const fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Register a new hook
    pub fn register(&mut self, hook: Box<dyn Hook>) {
        info!(hook = hook.name(), "Registered hook");
        self.hooks.push(hook);
    }

    /// Check if any hooks are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Get the number of registered hooks
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HookRunner for HookRegistry {
    fn has_hooks(&self) -> bool {
        !self.is_empty()
    }

    /// Execute all hooks for a tool call
    ///
    /// Hooks are executed in registration order and each one sees the
    /// parameters as rewritten by the hooks before it. A block stops the
    /// chain; so does the first hook error.
    async fn run_before_tool_call(
        &self,
        request: &BeforeToolCallRequest,
        context: &HookContext,
    ) -> Result<Option<HookDecision>, HookError> {
        let mut current = request.clone();
        let mut rewritten: Option<Map<String, serde_json::Value>> = None;

        for hook in &self.hooks {
            let decision = match hook.before_tool_call(&current, context).await {
                Ok(Some(decision)) => decision,
                Ok(None) => {
                    debug!(hook = hook.name(), "Hook returned no decision");
                    continue;
                }
                Err(err) => {
                    warn!(hook = hook.name(), error = %err, "Hook failed, aborting chain");
                    return Err(err);
                }
            };

            if decision.block {
                info!(
                    hook = hook.name(),
                    tool_name = %context.tool_name,
                    reason = decision.block_reason.as_deref().unwrap_or_default(),
                    "Hook blocking tool call"
                );
                return Ok(Some(HookDecision {
                    params: rewritten,
                    ..decision
                }));
            }

            if let Some(params) = decision.params {
                debug!(
                    hook = hook.name(),
                    keys = params.len(),
                    "Hook rewriting parameters"
                );
                for (key, value) in params {
                    current.params.insert(key.clone(), value.clone());
                    rewritten.get_or_insert_with(Map::new).insert(key, value);
                }
            }
        }

        Ok(rewritten.map(HookDecision::with_params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct TestHook {
        name: &'static str,
        result: Option<HookDecision>,
        calls: Arc<AtomicUsize>,
    }

    impl TestHook {
        fn boxed(name: &'static str, result: Option<HookDecision>) -> (Box<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let hook = Box::new(Self {
                name,
                result,
                calls: Arc::clone(&calls),
            });
            (hook, calls)
        }
    }

    #[async_trait]
    impl Hook for TestHook {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn before_tool_call(
            &self,
            _request: &BeforeToolCallRequest,
            _context: &HookContext,
        ) -> Result<Option<HookDecision>, HookError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.result.clone())
        }
    }

    /// Hook that doubles the `n` parameter it is shown.
    struct DoublingHook;

    #[async_trait]
    impl Hook for DoublingHook {
        fn name(&self) -> &'static str {
            "doubling"
        }

        async fn before_tool_call(
            &self,
            request: &BeforeToolCallRequest,
            _context: &HookContext,
        ) -> Result<Option<HookDecision>, HookError> {
            let n = request.params.get("n").and_then(Value::as_i64).unwrap_or(0);
            Ok(Some(HookDecision::with_params(params(json!({ "n": n * 2 })))))
        }
    }

    struct FailingHook;

    #[async_trait]
    impl Hook for FailingHook {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn before_tool_call(
            &self,
            _request: &BeforeToolCallRequest,
            _context: &HookContext,
        ) -> Result<Option<HookDecision>, HookError> {
            Err(HookError::Failed {
                hook: "failing".to_string(),
                reason: "boom".to_string(),
            })
        }
    }

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn request(value: Value) -> BeforeToolCallRequest {
        BeforeToolCallRequest {
            tool_name: "exec".to_string(),
            params: params(value),
        }
    }

    fn context() -> HookContext {
        HookContext {
            tool_name: "exec".to_string(),
            ..HookContext::default()
        }
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let registry = HookRegistry::new();
        assert!(!registry.has_hooks());

        let decision = registry
            .run_before_tool_call(&request(json!({})), &context())
            .await
            .expect("empty registry never fails");
        assert!(decision.is_none());
    }

    #[tokio::test]
    async fn test_block_stops_chain() {
        let mut registry = HookRegistry::new();
        let (first, first_calls) = TestHook::boxed("first", None);
        let (second, _) = TestHook::boxed("second", Some(HookDecision::block("nope")));
        let (third, third_calls) = TestHook::boxed("third", None);
        registry.register(first);
        registry.register(second);
        registry.register(third);
        assert_eq!(registry.len(), 3);

        let decision = registry
            .run_before_tool_call(&request(json!({})), &context())
            .await
            .expect("chain succeeds")
            .expect("block decision");

        assert!(decision.block);
        assert_eq!(decision.block_reason.as_deref(), Some("nope"));
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rewrites_chain_through_hooks() {
        let mut registry = HookRegistry::new();
        registry.register(Box::new(DoublingHook));
        registry.register(Box::new(DoublingHook));
        let (tagger, _) = TestHook::boxed(
            "tagger",
            Some(HookDecision::with_params(params(json!({ "tag": "x" })))),
        );
        registry.register(tagger);

        let decision = registry
            .run_before_tool_call(&request(json!({ "n": 3, "keep": true })), &context())
            .await
            .expect("chain succeeds")
            .expect("rewrite decision");

        assert!(!decision.block);
        assert_eq!(
            decision.params,
            Some(params(json!({ "n": 12, "tag": "x" })))
        );
    }

    #[tokio::test]
    async fn test_first_error_aborts_chain() {
        let mut registry = HookRegistry::new();
        registry.register(Box::new(FailingHook));
        let (after, after_calls) = TestHook::boxed("after", Some(HookDecision::block("late")));
        registry.register(after);

        let result = registry
            .run_before_tool_call(&request(json!({})), &context())
            .await;

        assert!(matches!(result, Err(HookError::Failed { .. })));
        assert_eq!(after_calls.load(Ordering::SeqCst), 0);
    }
}

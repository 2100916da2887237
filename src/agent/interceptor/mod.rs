//! Tool interceptor
//!
//! Wraps an agent tool so each call runs through a fixed pipeline:
//! normalize parameters, refuse calls covered by an earlier loop trip,
//! consult before-call hooks, run the tool, record the outcome with the
//! loop detector, and hand the tool's result back untouched.

mod error;
mod params;

pub use error::ToolCallError;
pub use params::{merge_params, normalize_params};

use crate::agent::hooks::{BeforeToolCallRequest, HookContext, HookDecision, HookRunner};
use crate::agent::identity::ToolCallContext;
use crate::agent::loop_detection::{
    CallSignature, LoopDetector, LoopVerdict, ProgressFingerprint, ToolClass,
};
use crate::agent::tool::{AgentTool, ToolMetadata, ToolResult, ToolUpdateSender};
use crate::config::DEFAULT_BLOCK_REASON;
use crate::llm::ToolDefinition;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Factory that wraps tools with hook consultation and loop detection.
#[derive(Clone)]
pub struct ToolInterceptor {
    hook_runner: Arc<dyn HookRunner>,
    loop_detector: Arc<LoopDetector>,
}

impl ToolInterceptor {
    /// Create an interceptor over a hook runner and a loop detector.
    #[must_use]
    pub fn new(hook_runner: Arc<dyn HookRunner>, loop_detector: Arc<LoopDetector>) -> Self {
        Self {
            hook_runner,
            loop_detector,
        }
    }

    /// Shared loop detector.
    #[must_use]
    pub fn loop_detector(&self) -> Arc<LoopDetector> {
        Arc::clone(&self.loop_detector)
    }

    /// Wrap a tool for calls made under `context`.
    ///
    /// A tool that is already intercepted is returned as-is, so a logical
    /// tool is never intercepted twice.
    #[must_use]
    pub fn wrap(&self, tool: Arc<dyn AgentTool>, context: ToolCallContext) -> Arc<dyn AgentTool> {
        if tool.is_intercepted() {
            debug!(tool_name = tool.name(), "Tool already intercepted, reusing wrapper");
            return tool;
        }

        Arc::new(InterceptedTool {
            tool_name: tool.name().to_lowercase(),
            metadata: tool.metadata(),
            inner: tool,
            context,
            hook_runner: Arc::clone(&self.hook_runner),
            loop_detector: Arc::clone(&self.loop_detector),
        })
    }
}

/// A tool running behind the interceptor pipeline.
pub struct InterceptedTool {
    inner: Arc<dyn AgentTool>,
    tool_name: String,
    metadata: ToolMetadata,
    context: ToolCallContext,
    hook_runner: Arc<dyn HookRunner>,
    loop_detector: Arc<LoopDetector>,
}

impl InterceptedTool {
    /// Consult hooks and return the parameters to forward.
    ///
    /// Hook failures are logged and treated as no decision.
    async fn apply_hooks(
        &self,
        raw: Value,
        normalized: &Map<String, Value>,
    ) -> Result<Value, ToolCallError> {
        if !self.hook_runner.has_hooks() {
            return Ok(raw);
        }

        let request = BeforeToolCallRequest {
            tool_name: self.tool_name.clone(),
            params: normalized.clone(),
        };
        let context = HookContext {
            tool_name: self.tool_name.clone(),
            agent_id: self.context.agent_id.clone(),
            session_key: self.context.session_key.as_ref().map(ToString::to_string),
        };

        let decision = match self.hook_runner.run_before_tool_call(&request, &context).await {
            Ok(decision) => decision,
            Err(err) => {
                warn!(
                    tool_name = %self.tool_name,
                    error = %err,
                    "before_tool_call hook failed, continuing without hook decision"
                );
                None
            }
        };

        match decision {
            Some(HookDecision {
                block: true,
                block_reason,
                ..
            }) => {
                let reason = block_reason
                    .filter(|reason| !reason.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_BLOCK_REASON.to_string());
                info!(tool_name = %self.tool_name, reason = %reason, "Tool call blocked by hook");
                Err(ToolCallError::Blocked {
                    tool_name: self.tool_name.clone(),
                    reason,
                })
            }
            Some(HookDecision {
                params: Some(params),
                ..
            }) => {
                debug!(tool_name = %self.tool_name, keys = params.len(), "Hook rewrote parameters");
                Ok(Value::Object(merge_params(normalized.clone(), params)))
            }
            Some(_) | None => Ok(raw),
        }
    }

    async fn record_outcome(
        &self,
        signature: &CallSignature,
        class: ToolClass,
        outcome: &Result<ToolResult>,
    ) {
        let detail_fields = &self.loop_detector.config().progress_detail_fields;
        let fingerprint = match outcome {
            Ok(result) => ProgressFingerprint::of_result(result, detail_fields),
            Err(err) => ProgressFingerprint::of_error(&format!("{err:#}")),
        };

        let trip = self
            .loop_detector
            .record(self.context.session_key.as_ref(), signature, class, fingerprint)
            .await;

        if let Some(trip) = trip {
            warn!(
                tool_name = %self.tool_name,
                trip = ?trip,
                "Loop threshold reached; returning this result, refusing the next call"
            );
        }
    }
}

#[async_trait]
impl AgentTool for InterceptedTool {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn definition(&self) -> ToolDefinition {
        self.inner.definition()
    }

    fn metadata(&self) -> ToolMetadata {
        self.metadata.clone()
    }

    fn is_intercepted(&self) -> bool {
        true
    }

    async fn execute(
        &self,
        call_id: &str,
        params: Value,
        cancellation_token: Option<&CancellationToken>,
        update_tx: Option<&ToolUpdateSender>,
    ) -> Result<ToolResult> {
        let normalized = normalize_params(&params);
        let session_key = self.context.session_key.as_ref();
        let signature = CallSignature::new(&self.tool_name, &normalized);
        let class = self
            .loop_detector
            .classify(&self.tool_name, &self.metadata, &normalized);

        if let LoopVerdict::Block(trip) =
            self.loop_detector.check(session_key, &signature, class).await
        {
            return Err(ToolCallError::from_trip(&self.tool_name, trip).into());
        }

        let forwarded = self.apply_hooks(params, &normalized).await?;

        debug!(tool_name = %self.tool_name, call_id, class = ?class, "Executing intercepted tool call");
        let outcome = self
            .inner
            .execute(call_id, forwarded, cancellation_token, update_tx)
            .await;

        self.record_outcome(&signature, class, &outcome).await;
        outcome
    }
}

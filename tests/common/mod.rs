#![allow(dead_code)]

use async_trait::async_trait;
use oxide_tool_guard::agent::hooks::{
    BeforeToolCallRequest, HookContext, HookDecision, HookError, HookRunner,
};
use oxide_tool_guard::agent::{
    AgentTool, LoopDetectionConfig, LoopDetector, SessionKey, ToolCallContext, ToolInterceptor,
    ToolMetadata, ToolResult, ToolUpdateSender,
};
use oxide_tool_guard::llm::ToolDefinition;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// What a scripted tool returns on each call.
#[derive(Clone, Copy)]
pub enum Output {
    /// Same text every call
    Fixed(&'static str),
    /// Different text every call
    Changing,
    /// Same failure every call
    Failing(&'static str),
}

pub struct ScriptedTool {
    name: &'static str,
    output: Output,
    metadata: ToolMetadata,
    calls: AtomicUsize,
    params: Mutex<Vec<Value>>,
}

impl ScriptedTool {
    pub fn new(name: &'static str, output: Output) -> Arc<Self> {
        Self::with_metadata(name, output, ToolMetadata::default())
    }

    pub fn with_metadata(name: &'static str, output: Output, metadata: ToolMetadata) -> Arc<Self> {
        Arc::new(Self {
            name,
            output,
            metadata,
            calls: AtomicUsize::new(0),
            params: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<Value> {
        self.params
            .lock()
            .map(|params| params.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AgentTool for ScriptedTool {
    fn name(&self) -> &str {
        self.name
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: format!("Scripted {} tool", self.name),
            parameters: json!({ "type": "object" }),
        }
    }

    fn metadata(&self) -> ToolMetadata {
        self.metadata.clone()
    }

    async fn execute(
        &self,
        _call_id: &str,
        params: Value,
        _cancellation_token: Option<&CancellationToken>,
        _update_tx: Option<&ToolUpdateSender>,
    ) -> anyhow::Result<ToolResult> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut received) = self.params.lock() {
            received.push(params);
        }
        match self.output {
            Output::Fixed(text) => Ok(ToolResult::text(text)),
            Output::Changing => Ok(ToolResult::text(format!("output #{call}"))),
            Output::Failing(message) => Err(anyhow::anyhow!(message)),
        }
    }
}

/// Hook runner that counts invocations and always answers with `decision`.
pub struct CountingHookRunner {
    pub calls: AtomicUsize,
    decision: Option<HookDecision>,
}

impl CountingHookRunner {
    pub fn new(decision: Option<HookDecision>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            decision,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HookRunner for CountingHookRunner {
    fn has_hooks(&self) -> bool {
        true
    }

    async fn run_before_tool_call(
        &self,
        _request: &BeforeToolCallRequest,
        _context: &HookContext,
    ) -> Result<Option<HookDecision>, HookError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.decision.clone())
    }
}

pub fn interceptor(runner: Arc<dyn HookRunner>) -> ToolInterceptor {
    interceptor_with(runner, LoopDetectionConfig::default())
}

pub fn interceptor_with(runner: Arc<dyn HookRunner>, config: LoopDetectionConfig) -> ToolInterceptor {
    ToolInterceptor::new(runner, Arc::new(LoopDetector::new(Arc::new(config))))
}

pub fn session(session_id: &str) -> ToolCallContext {
    ToolCallContext::new("main", SessionKey::for_agent("main", session_id))
}

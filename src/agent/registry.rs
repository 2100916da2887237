//! Tool Registry - manages the intercepted tools of one agent session
//!
//! Every registered tool is wrapped once by the tool interceptor; the
//! adapter shapes handed out afterwards all share that single wrapper.

use super::adapters::{AgentToolAdapter, ClientToolAdapter};
use super::identity::ToolCallContext;
use super::interceptor::ToolInterceptor;
use super::tool::{AgentTool, ToolResult, ToolUpdateSender};
use crate::llm::{ToolCall, ToolDefinition};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Registry that manages the intercepted tools of one session
pub struct ToolRegistry {
    interceptor: ToolInterceptor,
    context: ToolCallContext,
    tools: Vec<AgentToolAdapter>,
}

impl ToolRegistry {
    /// Create a new empty registry for calls made under `context`
    #[must_use]
    pub fn new(interceptor: ToolInterceptor, context: ToolCallContext) -> Self {
        Self {
            interceptor,
            context,
            tools: Vec::new(),
        }
    }

    /// Register a tool, wrapping it with the interceptor
    ///
    /// A tool with the same (case-insensitive) name replaces the earlier one.
    /// An already intercepted tool is kept as-is, together with the context
    /// it was wrapped with: its loop state stays with that session, not with
    /// this registry's.
    pub fn register(&mut self, tool: Arc<dyn AgentTool>) {
        if tool.is_intercepted() {
            warn!(
                tool = tool.name(),
                "Registering an already intercepted tool; it keeps its original call context"
            );
        }

        let wrapped = self.interceptor.wrap(tool, self.context.clone());
        let name = wrapped.name().to_string();

        if let Some(index) = self.position(&name) {
            warn!(tool = %name, "Replacing previously registered tool");
            self.tools.remove(index);
        }

        info!(tool = %name, "Registered tool");
        self.tools.push(AgentToolAdapter::new(wrapped));
    }

    /// Get all tool definitions for the model
    #[must_use]
    pub fn all_tools(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(AgentToolAdapter::definition).collect()
    }

    /// Internal tool-calling adapters
    #[must_use]
    pub fn agent_tools(&self) -> Vec<AgentToolAdapter> {
        self.tools.clone()
    }

    /// Client tool adapters sharing the same wrapped tools
    #[must_use]
    pub fn client_tools(&self) -> Vec<ClientToolAdapter> {
        self.tools.iter().map(ClientToolAdapter::from).collect()
    }

    /// Look up a wrapped tool by name
    #[must_use]
    pub fn get(&self, tool_name: &str) -> Option<Arc<dyn AgentTool>> {
        self.position(tool_name)
            .map(|index| Arc::clone(self.tools[index].tool()))
    }

    /// Check if a tool with this name is registered
    #[must_use]
    pub fn can_handle(&self, tool_name: &str) -> bool {
        self.position(tool_name).is_some()
    }

    /// Registered tool names
    #[must_use]
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|adapter| adapter.tool().name()).collect()
    }

    /// Find a tool and execute a model-issued call
    ///
    /// # Errors
    ///
    /// Returns an error if no tool matches or if the intercepted call fails.
    pub async fn execute(
        &self,
        tool_call: &ToolCall,
        cancellation_token: Option<&CancellationToken>,
        update_tx: Option<&ToolUpdateSender>,
    ) -> Result<ToolResult> {
        let tool_name = &tool_call.function.name;
        let Some(index) = self.position(tool_name) else {
            warn!(tool = %tool_name, "No tool registered under this name");
            return Err(anyhow!("Unknown tool: {tool_name}"));
        };

        debug!(tool = %tool_name, call_id = %tool_call.id, "Dispatching tool call");
        self.tools[index]
            .call(tool_call, cancellation_token, update_tx)
            .await
    }

    fn position(&self, tool_name: &str) -> Option<usize> {
        self.tools
            .iter()
            .position(|adapter| adapter.tool().name().eq_ignore_ascii_case(tool_name))
    }
}

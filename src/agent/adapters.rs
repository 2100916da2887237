//! Definition adapters
//!
//! Re-expose an intercepted tool in the two calling conventions the agent
//! runtime speaks: internal tool calls carrying JSON-string arguments, and
//! externally-hosted client function tools. Adapters hold the wrapped tool
//! by reference and never wrap it again, so a logical call is intercepted
//! exactly once however many adapter layers sit in front of it.

use crate::agent::tool::{AgentTool, ToolResult, ToolUpdateSender};
use crate::llm::{ToolCall, ToolDefinition};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

/// Internal agent tool-calling shape.
#[derive(Clone)]
pub struct AgentToolAdapter {
    tool: Arc<dyn AgentTool>,
}

impl AgentToolAdapter {
    /// Expose an (already intercepted) tool to the agent loop.
    #[must_use]
    pub fn new(tool: Arc<dyn AgentTool>) -> Self {
        Self { tool }
    }

    /// The tool this adapter calls into.
    #[must_use]
    pub fn tool(&self) -> &Arc<dyn AgentTool> {
        &self.tool
    }

    /// Definition shown to the model.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        self.tool.definition()
    }

    /// Execute a model-issued tool call.
    ///
    /// Arguments that are not valid JSON are forwarded as a raw string;
    /// the interceptor normalizes them to an empty mapping for hooks and
    /// loop detection.
    ///
    /// # Errors
    ///
    /// Propagates interceptor and tool failures.
    pub async fn call(
        &self,
        tool_call: &ToolCall,
        cancellation_token: Option<&CancellationToken>,
        update_tx: Option<&ToolUpdateSender>,
    ) -> Result<ToolResult> {
        let call_id = if tool_call.id.is_empty() {
            format!("call_{}", Uuid::new_v4())
        } else {
            tool_call.id.clone()
        };

        let params = parse_arguments(&tool_call.function.name, &tool_call.function.arguments);
        self.tool
            .execute(&call_id, params, cancellation_token, update_tx)
            .await
    }
}

fn parse_arguments(tool_name: &str, arguments: &str) -> Value {
    if arguments.trim().is_empty() {
        return Value::Object(serde_json::Map::new());
    }

    match serde_json::from_str::<Value>(arguments) {
        Ok(value) => value,
        Err(err) => {
            warn!(tool_name, error = %err, "Tool call arguments are not valid JSON");
            Value::String(arguments.to_string())
        }
    }
}

/// Function definition for externally-hosted client tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientToolDefinition {
    /// Always `"function"`
    #[serde(rename = "type")]
    pub kind: String,
    /// Function description
    pub function: ClientFunction,
}

/// Function body of a [`ClientToolDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientFunction {
    /// Function name
    pub name: String,
    /// What the function does
    pub description: String,
    /// JSON schema of the parameters
    pub parameters: Value,
}

impl From<ToolDefinition> for ClientToolDefinition {
    fn from(definition: ToolDefinition) -> Self {
        Self {
            kind: "function".to_string(),
            function: ClientFunction {
                name: definition.name,
                description: definition.description,
                parameters: definition.parameters,
            },
        }
    }
}

/// Externally-hosted client tool shape.
#[derive(Clone)]
pub struct ClientToolAdapter {
    tool: Arc<dyn AgentTool>,
}

impl ClientToolAdapter {
    /// Expose an (already intercepted) tool as a client function tool.
    #[must_use]
    pub fn new(tool: Arc<dyn AgentTool>) -> Self {
        Self { tool }
    }

    /// The tool this adapter calls into.
    #[must_use]
    pub fn tool(&self) -> &Arc<dyn AgentTool> {
        &self.tool
    }

    /// Client-facing function definition.
    #[must_use]
    pub fn definition(&self) -> ClientToolDefinition {
        self.tool.definition().into()
    }

    /// Invoke the tool with already-decoded parameters.
    ///
    /// # Errors
    ///
    /// Propagates interceptor and tool failures.
    pub async fn invoke(
        &self,
        call_id: &str,
        params: Value,
        cancellation_token: Option<&CancellationToken>,
        update_tx: Option<&ToolUpdateSender>,
    ) -> Result<ToolResult> {
        self.tool
            .execute(call_id, params, cancellation_token, update_tx)
            .await
    }
}

impl From<&AgentToolAdapter> for ClientToolAdapter {
    fn from(adapter: &AgentToolAdapter) -> Self {
        Self::new(Arc::clone(&adapter.tool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use serde_json::json;

    #[test]
    fn client_definition_shape() {
        let definition = ClientToolDefinition::from(ToolDefinition {
            name: "read_file".to_string(),
            description: "Read a file".to_string(),
            parameters: json!({ "type": "object" }),
        });
        let encoded = serde_json::to_string(&definition).unwrap_or_default();
        assert_snapshot!(encoded, @r#"{"type":"function","function":{"name":"read_file","description":"Read a file","parameters":{"type":"object"}}}"#);
    }

    #[test]
    fn arguments_parsing() {
        assert_eq!(parse_arguments("t", ""), json!({}));
        assert_eq!(parse_arguments("t", r#"{"a":1}"#), json!({ "a": 1 }));
        assert_eq!(parse_arguments("t", "not json"), json!("not json"));
    }
}

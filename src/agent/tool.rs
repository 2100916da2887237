//! Agent tool contract
//!
//! The execute signature shared by underlying tools and their intercepted
//! wrappers. A wrapped tool is indistinguishable from an unwrapped one
//! except by its behaviour.

use crate::agent::loop_detection::ToolClass;
use crate::llm::ToolDefinition;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Channel a tool may use to stream partial results while it runs.
pub type ToolUpdateSender = mpsc::Sender<ToolResult>;

/// A single item of tool output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    /// Plain text output
    Text {
        /// Text body
        text: String,
    },
    /// Base64-encoded image output
    Image {
        /// Base64 payload
        data: String,
        /// MIME type of the payload
        mime_type: String,
    },
}

impl ContentItem {
    /// Text item shorthand.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Text body, if this is a text item.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Image { .. } => None,
        }
    }
}

/// Result of a tool execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Output items shown to the agent
    pub content: Vec<ContentItem>,
    /// Structured side-channel details (status, aggregated output, ...)
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl ToolResult {
    /// Result with a single text item and no details.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(text)],
            details: Map::new(),
        }
    }

    /// Attach a detail field.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Concatenated text content.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentItem::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Metadata a tool declares about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolMetadata {
    /// Overrides the loop-detection classification derived from call parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_class: Option<ToolClass>,
}

/// Unified interface for executable agent tools
#[async_trait]
pub trait AgentTool: Send + Sync {
    /// Tool name as exposed to the agent
    fn name(&self) -> &str;

    /// Definition (description and parameter schema) shown to the model
    fn definition(&self) -> ToolDefinition;

    /// Declared metadata
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::default()
    }

    /// Whether this tool already runs behind a tool interceptor
    fn is_intercepted(&self) -> bool {
        false
    }

    /// Execute the tool
    ///
    /// # Arguments
    ///
    /// * `call_id` - Identifier of this call
    /// * `params` - Raw call parameters
    /// * `cancellation_token` - Optional token to allow cancellation of long-running operations
    /// * `update_tx` - Optional channel for streaming partial results
    async fn execute(
        &self,
        call_id: &str,
        params: Value,
        cancellation_token: Option<&CancellationToken>,
        update_tx: Option<&ToolUpdateSender>,
    ) -> Result<ToolResult>;
}

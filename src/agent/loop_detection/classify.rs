//! Poll-style vs generic classification of tool calls.

use super::config::LoopDetectionConfig;
use super::types::ToolClass;
use crate::agent::tool::ToolMetadata;
use serde_json::{Map, Value};

/// Classify a call for loop detection.
///
/// Precedence: the tool's declared `loop_class` metadata, then the configured
/// poll tool names, then the configured poll intent in the call parameters
/// (e.g. `{"action": "poll"}`).
#[must_use]
pub fn classify(
    tool_name: &str,
    metadata: &ToolMetadata,
    params: &Map<String, Value>,
    config: &LoopDetectionConfig,
) -> ToolClass {
    if let Some(class) = metadata.loop_class {
        return class;
    }

    if config
        .poll_tools
        .iter()
        .any(|poll_tool| poll_tool.eq_ignore_ascii_case(tool_name))
    {
        return ToolClass::PollStyle;
    }

    let is_poll_intent = params
        .get(&config.poll_action_field)
        .and_then(Value::as_str)
        .is_some_and(|action| {
            config
                .poll_actions
                .iter()
                .any(|poll_action| poll_action.eq_ignore_ascii_case(action.trim()))
        });

    if is_poll_intent {
        ToolClass::PollStyle
    } else {
        ToolClass::Generic
    }
}

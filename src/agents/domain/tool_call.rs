//! Tool call types for agent interactions

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A tool invocation requested by the reasoning engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier correlating this call with its result
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Arguments passed to the tool (as a JSON object)
    pub arguments: Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Outcome of executing one tool call.
///
/// Always produced, even on failure, in which case the payload is
/// `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this is responding to
    pub tool_call_id: String,
    /// Name of the tool that was called
    pub tool_name: String,
    /// Payload handed back to the engine
    pub payload: Value,
}

impl ToolResult {
    /// Successful result carrying `payload`
    pub fn success(call: &ToolCall, payload: Value) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            payload,
        }
    }

    /// Failed result, rendered as `{"error": message}`
    pub fn failure(call: &ToolCall, message: impl Into<String>) -> Self {
        Self::success(call, json!({ "error": message.into() }))
    }

    /// Error message if this result reports a failure
    pub fn error(&self) -> Option<&str> {
        self.payload.get("error").and_then(Value::as_str)
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }
}

/// Definition of a tool available to the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema defining the tool's parameters
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

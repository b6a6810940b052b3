//! Tool invocation types and the round-level executor trait.
//!
//! The model never calls tools directly: it emits [`ToolRequest`]s, the
//! orchestrator hands a whole round of them to a [`ToolExecutor`], and the
//! resulting [`ToolResult`]s are fed back as a single turn.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ExecutionError;

/// Declarative description of a tool shown to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool name used for dispatch.
    pub name: String,
    /// What the tool does and when to use it.
    pub description: String,
    /// JSON Schema naming required and optional parameters.
    pub input_schema: Value,
}

impl ToolSchema {
    /// Create a schema.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Whether the schema declares a usable name.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// A request from the model to execute a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Correlation ID, echoed back in the matching [`ToolResult`].
    pub id: String,
    /// Name of the tool to execute.
    pub name: String,
    /// Arguments exactly as the model produced them.
    ///
    /// This is expected to be a JSON object; anything else cannot be
    /// dispatched and fails the round.
    pub arguments: Value,
}

impl ToolRequest {
    /// Create a tool request.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Parse arguments from a JSON string.
    pub fn from_call(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments_json: &str,
    ) -> Result<Self, serde_json::Error> {
        let arguments: Value = serde_json::from_str(arguments_json)?;
        Ok(Self::new(id, name, arguments))
    }

    /// The arguments as a keyword map, if they are an object.
    pub fn argument_map(&self) -> Option<&Map<String, Value>> {
        self.arguments.as_object()
    }

    /// Get a string argument by name.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

/// Result of one tool execution, rendered to text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The tool call ID this result corresponds to.
    pub tool_call_id: String,
    /// Tool output. Tool-level failures are rendered here as text too.
    pub content: String,
}

impl ToolResult {
    /// Create a tool result for the given call.
    pub fn new(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }
}

/// Executes one round of tool invocations.
///
/// Implementations must either return exactly one result per request, in
/// request order, or fail the whole batch. Partial rounds are never
/// returned.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Schemas of every tool this executor can dispatch, in registration order.
    fn schemas(&self) -> Vec<ToolSchema>;

    /// Execute every request of a round.
    async fn execute_batch(
        &self,
        requests: &[ToolRequest],
    ) -> Result<Vec<ToolResult>, ExecutionError>;
}

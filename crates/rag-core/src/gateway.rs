//! The language model gateway contract.

use async_trait::async_trait;

use crate::conversation::Turn;
use crate::error::GatewayError;
use crate::tools::{ToolRequest, ToolSchema};

/// One stateless request to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRequest {
    /// System-level instructions for this call.
    pub system_prompt: String,
    /// Full turn sequence so far.
    pub turns: Vec<Turn>,
    /// Tools offered to the model with automatic choice, or `None` to
    /// withhold tools entirely.
    pub tools: Option<Vec<ToolSchema>>,
}

impl GatewayRequest {
    /// A request that offers no tools.
    pub fn without_tools(system_prompt: impl Into<String>, turns: Vec<Turn>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            turns,
            tools: None,
        }
    }

    /// A request that lets the model decide whether to call any of `tools`.
    pub fn with_tools(
        system_prompt: impl Into<String>,
        turns: Vec<Turn>,
        tools: Vec<ToolSchema>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            turns,
            tools: Some(tools),
        }
    }

    /// Whether any tool schema is attached.
    pub fn offers_tools(&self) -> bool {
        self.tools.as_ref().is_some_and(|tools| !tools.is_empty())
    }
}

/// What the model answered.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// A final textual answer.
    Text(String),
    /// The model wants tools run before it answers.
    ToolUse {
        /// Text emitted alongside the requests, if any.
        text: Option<String>,
        requests: Vec<ToolRequest>,
    },
}

impl ModelReply {
    /// Whether the model requested tool invocations.
    pub fn is_tool_use(&self) -> bool {
        matches!(self, ModelReply::ToolUse { .. })
    }

    /// Any text carried by the reply.
    pub fn text(&self) -> Option<&str> {
        match self {
            ModelReply::Text(text) => Some(text.as_str()),
            ModelReply::ToolUse { text, .. } => text.as_deref(),
        }
    }
}

/// Stateless access to a language model.
///
/// Given a system prompt, a turn sequence, and an optional tool list, the
/// gateway returns either text or a set of tool invocation requests. It
/// holds no conversation state between calls.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Issue one request to the model.
    async fn generate(&self, request: GatewayRequest) -> Result<ModelReply, GatewayError>;

    /// Human-readable name of this gateway.
    fn name(&self) -> &str;
}

//! Anthropic Messages API request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A content block inside a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
    /// Block types this client does not interpret (e.g. thinking).
    #[serde(other)]
    Unsupported,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Role: "user" or "assistant"
    pub role: String,
    /// Message content blocks
    pub content: Vec<ContentBlock>,
}

impl ApiMessage {
    /// Create a user message.
    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: "assistant".to_string(),
            content,
        }
    }
}

/// A client tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// How the model may pick tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolChoice {
    /// Choice type: "auto", "any", "tool" or "none"
    #[serde(rename = "type")]
    pub choice_type: String,
}

impl ToolChoice {
    /// Let the model decide whether to call tools.
    pub fn auto() -> Self {
        Self {
            choice_type: "auto".to_string(),
        }
    }
}

/// Messages request to the Anthropic API.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    /// Model to use
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Temperature for generation
    pub temperature: f32,
    /// System prompt
    #[serde(skip_serializing_if = "String::is_empty")]
    pub system: String,
    /// Messages in the conversation
    pub messages: Vec<ApiMessage>,
    /// Tools to make available (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ApiTool>>,
    /// Tool choice, sent only alongside tools
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

/// Messages response from the Anthropic API.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    /// Response ID
    pub id: String,
    /// Model used
    pub model: String,
    /// Content blocks
    pub content: Vec<ContentBlock>,
    /// Why generation stopped: "end_turn", "tool_use", "max_tokens", ...
    pub stop_reason: Option<String>,
    /// Token usage
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Error details
    pub error: ApiErrorDetails,
}

/// API error details.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetails {
    /// Error type
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    /// Error message
    pub message: String,
}

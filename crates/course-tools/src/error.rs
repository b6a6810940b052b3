//! Error types for tool operations.

use thiserror::Error;

/// Errors that can occur while registering or binding a tool.
///
/// Problems a tool can explain to the model (no results, unknown course,
/// store failures) are returned as text, not as a `ToolError`. These
/// variants cover the cases where an invocation cannot be carried out at all.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A tool was registered with an unusable schema.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing required parameter.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// Invalid parameter value.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A parameter the tool does not declare.
    #[error("Unexpected parameter: {0}")]
    UnexpectedParameter(String),

    /// Arguments were not a keyword object.
    #[error("Malformed arguments: {0}")]
    MalformedArguments(String),
}

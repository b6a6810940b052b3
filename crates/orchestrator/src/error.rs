//! Error types for orchestrator operations.

use course_tools::ToolError;
use rag_core::GatewayError;
use thiserror::Error;

/// Errors that can occur during orchestration.
///
/// Tool-level problems never show up here: they reach the model as text,
/// and a failed tool round degrades to a fallback answer.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The model gateway could not be reached or rejected the request.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Tool setup failed.
    #[error("tool setup failed: {0}")]
    Tool(#[from] ToolError),
}

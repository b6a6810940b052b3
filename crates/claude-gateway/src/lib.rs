//! Anthropic Messages API gateway.
//!
//! This crate provides an [`LlmGateway`] that talks to Claude over the
//! Anthropic Messages API. It is stateless: every call carries the full
//! turn sequence, and tool schemas are attached only when the caller
//! offers tools.
//!
//! # Features
//!
//! - Maps conversation turns onto `text`, `tool_use` and `tool_result` blocks
//! - Automatic tool choice whenever schemas are supplied
//! - Configurable via environment variables
//!
//! # Usage
//!
//! ```rust,no_run
//! use claude_gateway::AnthropicGateway;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = AnthropicGateway::from_env()?;
//!     // Hand the gateway to an orchestrator...
//!     Ok(())
//! }
//! ```

mod api_types;
mod config;
mod gateway;

pub use config::{ClaudeGatewayConfig, ClaudeGatewayConfigBuilder};
pub use gateway::AnthropicGateway;

// Re-export rag-core types for convenience
pub use rag_core::{async_trait, GatewayError, GatewayRequest, LlmGateway, ModelReply};

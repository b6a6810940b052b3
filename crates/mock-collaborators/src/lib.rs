//! Mock collaborators for exercising the course assistant without a network.
//!
//! This crate provides stand-ins for the two external services:
//! - `ScriptedGateway` - Replays a queue of model replies and records every request
//! - `DelayedGateway` - Wraps another gateway with artificial latency
//! - `StaticStore` - Serves canned search results and course metadata
//!
//! For a real model, use the `claude-gateway` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_collaborators::{GatewayRequest, LlmGateway, ModelReply, ScriptedGateway, Turn};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_collaborators::GatewayError> {
//!     let gateway = ScriptedGateway::new().then_text("Hello!");
//!
//!     let request = GatewayRequest::without_tools("Be brief.", vec![Turn::user("Hi")]);
//!     let reply = gateway.generate(request).await?;
//!
//!     assert_eq!(reply, ModelReply::Text("Hello!".to_string()));
//!     assert_eq!(gateway.call_count().await, 1);
//!     Ok(())
//! }
//! ```

mod delayed;
mod scripted;
mod store;

// Re-export rag-core types for convenience
pub use rag_core::{
    async_trait, GatewayError, GatewayRequest, LlmGateway, ModelReply, RetrievalStore,
    SearchResults, ToolRequest, Turn,
};

pub use delayed::DelayedGateway;
pub use scripted::ScriptedGateway;
pub use store::{SearchCall, StaticStore};

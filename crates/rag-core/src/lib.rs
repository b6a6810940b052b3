//! Core contracts for the course-material question answering service.
//!
//! This crate provides the shared interface between the orchestration loop,
//! the tools it dispatches, and the external collaborators it talks to:
//!
//! - [`LlmGateway`] - Stateless request/response access to a language model
//! - [`ModelReply`] - Either plain text or a batch of tool invocation requests
//! - [`Conversation`] / [`Turn`] - The append-only turn sequence of one run
//! - [`ToolExecutor`] - Dispatch of one round of tool invocations
//! - [`RetrievalStore`] - Semantic search and course metadata lookup
//! - [`SessionHistory`] - In-memory per-session exchange history
//!
//! # Example
//!
//! ```rust
//! use rag_core::{async_trait, GatewayError, GatewayRequest, LlmGateway, ModelReply};
//!
//! struct CannedGateway;
//!
//! #[async_trait]
//! impl LlmGateway for CannedGateway {
//!     async fn generate(&self, _request: GatewayRequest) -> Result<ModelReply, GatewayError> {
//!         Ok(ModelReply::Text("Hello!".to_string()))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "CannedGateway"
//!     }
//! }
//! ```

mod conversation;
mod error;
mod gateway;
mod history;
pub mod prompt;
mod store;
mod tools;

pub use conversation::{Conversation, Role, Turn, TurnPayload};
pub use error::{ExecutionError, GatewayError, StoreError};
pub use gateway::{GatewayRequest, LlmGateway, ModelReply};
pub use history::SessionHistory;
pub use store::{
    ChunkMetadata, CourseMetadata, LessonMetadata, RetrievalStore, SearchHit, SearchResults,
};
pub use tools::{ToolExecutor, ToolRequest, ToolResult, ToolSchema};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

//! Tool registry and course retrieval tools.
//!
//! This crate provides a [`ToolRegistry`] holding the tools the model may
//! call while answering a question, plus the two course tools themselves.
//! Tools take keyword arguments and return text for the model to read.
//!
//! # Architecture
//!
//! The [`Tool`] trait is per-tool; rag-core's `ToolExecutor` is per-round.
//! [`RegistryToolExecutor`] adapts a registry to the latter, dispatching
//! every request of a round concurrently and correlating results by call id.
//!
//! Tools that cite sources implement [`ProvenanceSource`]. After a run the
//! caller reads [`ToolRegistry::latest_provenance`] and then clears it.
//!
//! # Built-in Tools
//!
//! - [`ContentSearchTool`] - `search_course_content`, semantic search over lesson chunks.
//! - [`OutlineTool`] - `get_course_outline`, title, instructor, link and lesson list.
//!
//! # Example
//!
//! ```rust,ignore
//! use course_tools::{course_registry, RegistryToolExecutor};
//! use serde_json::json;
//!
//! let registry = course_registry(store)?;
//! let text = registry
//!     .invoke("get_course_outline", &json!({"course_title": "MCP"}))
//!     .await?;
//! println!("{}", text);
//! ```

mod error;
mod executor;
mod provenance;
mod registry;
mod tool;
pub mod tools;

use std::sync::Arc;

use rag_core::RetrievalStore;

pub use error::ToolError;
pub use executor::RegistryToolExecutor;
pub use provenance::{Provenance, LINK_SEPARATOR};
pub use registry::ToolRegistry;
pub use tool::{ProvenanceSource, Tool, ToolArgs, ToolOutput};
pub use tools::{ContentSearchTool, OutlineTool};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

/// Create a registry with both course tools over the given store.
///
/// Search is registered first, so its schema leads the list offered to the
/// model and its provenance is consulted first.
pub fn course_registry(store: Arc<dyn RetrievalStore>) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(ContentSearchTool::new(store.clone()))?;
    registry.register(OutlineTool::new(store))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_collaborators::StaticStore;

    #[test]
    fn test_course_registry_order() {
        let registry = course_registry(Arc::new(StaticStore::new())).unwrap();
        assert_eq!(
            registry.list_tools(),
            vec!["search_course_content", "get_course_outline"]
        );
    }
}

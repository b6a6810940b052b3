//! Tool registry for managing and dispatching tools.

use std::sync::Arc;

use indexmap::IndexMap;
use rag_core::ToolSchema;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ToolError;
use crate::provenance::Provenance;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Registry for managing tools.
///
/// The registry is the single dispatch point for tool invocations and the
/// only channel through which provenance flows back out of a run. Tools are
/// kept in registration order.
///
/// Provenance is stored on the tools themselves, so a registry instance
/// must not be shared between concurrently running queries.
pub struct ToolRegistry {
    /// Registered tools by name, in registration order.
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: IndexMap::new(),
        }
    }

    /// Register a tool.
    ///
    /// Fails if the tool's schema declares no name. If a tool with the same
    /// name already exists, it is replaced in place.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<(), ToolError> {
        self.register_shared(Arc::new(tool))
    }

    /// Register a shared tool.
    pub fn register_shared(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let schema = tool.schema();
        if !schema.has_name() {
            return Err(ToolError::Configuration(
                "tool schema must declare a name".to_string(),
            ));
        }

        info!("Registering tool: {}", schema.name);
        self.tools.insert(schema.name, tool);
        Ok(())
    }

    /// Get a list of registered tool names.
    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Check if a tool is registered.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Schemas of every registered tool, in registration order.
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    /// Invoke a tool by name and record its provenance.
    ///
    /// An unknown name is not an error: it yields a text result the model
    /// can read. `Err` is returned only when the arguments cannot be bound.
    pub async fn invoke(&self, name: &str, arguments: &Value) -> Result<String, ToolError> {
        let output = self.dispatch(name, arguments).await?;
        if let Some(sources) = output.sources {
            self.record_provenance(name, sources).await;
        }
        Ok(output.content)
    }

    /// Run a tool by name without recording its provenance.
    ///
    /// Same contract as [`invoke`](Self::invoke); the sources come back in
    /// the output for the caller to record.
    pub async fn dispatch(&self, name: &str, arguments: &Value) -> Result<ToolOutput, ToolError> {
        let Some(tool) = self.tools.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return Ok(ToolOutput::text(format!("Tool '{}' not found", name)));
        };

        let args = ToolArgs::from_value(arguments)?;
        debug!("Executing tool '{}' with {} params", name, args.params.len());

        let output = tool.run(args).await?;

        debug!(
            "Tool '{}' completed: content_len={}",
            name,
            output.content.len()
        );
        Ok(output)
    }

    /// Replace the provenance held by `name`, if it tracks any.
    pub async fn record_provenance(&self, name: &str, sources: Vec<Provenance>) {
        if let Some(source) = self.tools.get(name).and_then(|tool| tool.provenance()) {
            source.record(sources).await;
        }
    }

    /// Provenance of the most recent execution of any tracking tool.
    ///
    /// Returns the first non-empty list found, in registration order.
    pub async fn latest_provenance(&self) -> Vec<Provenance> {
        for tool in self.tools.values() {
            if let Some(source) = tool.provenance() {
                let latest = source.latest().await;
                if !latest.is_empty() {
                    return latest;
                }
            }
        }
        Vec::new()
    }

    /// [`latest_provenance`](Self::latest_provenance) in its `label|link` form.
    pub async fn latest_sources(&self) -> Vec<String> {
        self.latest_provenance()
            .await
            .iter()
            .map(Provenance::encode)
            .collect()
    }

    /// Reset provenance on every tool that tracks it.
    pub async fn clear_provenance(&self) {
        for tool in self.tools.values() {
            if let Some(source) = tool.provenance() {
                source.clear().await;
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

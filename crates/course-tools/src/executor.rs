//! ToolExecutor implementation backed by ToolRegistry.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use rag_core::{ExecutionError, ToolExecutor, ToolRequest, ToolResult, ToolSchema};
use tracing::{debug, warn};

use crate::provenance::Provenance;
use crate::ToolRegistry;

/// Runs whole tool rounds against a [`ToolRegistry`].
///
/// Requests within a round are independent, so they are dispatched
/// concurrently. The round succeeds only if every request could be bound;
/// otherwise the entire batch fails and no results are returned.
///
/// Provenance is recorded only once the whole round has succeeded, in
/// request order, so the last requested search supplies the sources no
/// matter which one finished last. A failed round records nothing.
pub struct RegistryToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl RegistryToolExecutor {
    pub fn new(registry: ToolRegistry) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    pub fn from_shared(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.registry.as_ref()
    }

    /// Provenance of the latest execution, see [`ToolRegistry::latest_provenance`].
    pub async fn latest_provenance(&self) -> Vec<Provenance> {
        self.registry.latest_provenance().await
    }
}

#[async_trait]
impl ToolExecutor for RegistryToolExecutor {
    fn schemas(&self) -> Vec<ToolSchema> {
        self.registry.list_schemas()
    }

    async fn execute_batch(
        &self,
        requests: &[ToolRequest],
    ) -> Result<Vec<ToolResult>, ExecutionError> {
        if requests.is_empty() {
            return Err(ExecutionError::EmptyBatch);
        }

        debug!("Dispatching tool round with {} request(s)", requests.len());

        let outcomes = join_all(
            requests
                .iter()
                .map(|request| self.registry.dispatch(&request.name, &request.arguments)),
        )
        .await;

        let mut outputs = Vec::with_capacity(requests.len());
        for (request, outcome) in requests.iter().zip(outcomes) {
            match outcome {
                Ok(output) => outputs.push(output),
                Err(error) => {
                    warn!("Tool round aborted at '{}': {}", request.name, error);
                    return Err(ExecutionError::Dispatch {
                        tool: request.name.clone(),
                        call_id: request.id.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        let mut results = Vec::with_capacity(requests.len());
        for (request, output) in requests.iter().zip(outputs) {
            if let Some(sources) = output.sources {
                self.registry.record_provenance(&request.name, sources).await;
            }
            results.push(ToolResult::new(&request.id, output.content));
        }

        Ok(results)
    }
}

//! Scripted gateway implementation - replays queued replies in order.

use std::collections::VecDeque;

use rag_core::{async_trait, GatewayError, GatewayRequest, LlmGateway, ModelReply, ToolRequest};
use tokio::sync::Mutex;

/// A gateway that answers from a fixed script and records what it was asked.
///
/// Each call to [`generate`](LlmGateway::generate) pops the next scripted
/// outcome. Once the script runs out, calls fail with
/// [`GatewayError::MalformedResponse`] so an over-long loop shows up as a
/// test failure rather than a hang.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Result<ModelReply, GatewayError>>>,
    requests: Mutex<Vec<GatewayRequest>>,
}

impl ScriptedGateway {
    /// Create a gateway with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an arbitrary outcome.
    pub fn then(mut self, outcome: Result<ModelReply, GatewayError>) -> Self {
        self.script.get_mut().push_back(outcome);
        self
    }

    /// Queue a plain text reply.
    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.then(Ok(ModelReply::Text(text.into())))
    }

    /// Queue a tool use reply with no accompanying text.
    pub fn then_tool_use(self, requests: Vec<ToolRequest>) -> Self {
        self.then(Ok(ModelReply::ToolUse {
            text: None,
            requests,
        }))
    }

    /// Queue a tool use reply that also carries text.
    pub fn then_tool_use_with_text(
        self,
        text: impl Into<String>,
        requests: Vec<ToolRequest>,
    ) -> Self {
        self.then(Ok(ModelReply::ToolUse {
            text: Some(text.into()),
            requests,
        }))
    }

    /// Queue a gateway failure.
    pub fn then_error(self, error: GatewayError) -> Self {
        self.then(Err(error))
    }

    /// Number of requests received so far.
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Every request received so far, in order.
    pub async fn requests(&self) -> Vec<GatewayRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of scripted outcomes not yet consumed.
    pub async fn remaining(&self) -> usize {
        self.script.lock().await.len()
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn generate(&self, request: GatewayRequest) -> Result<ModelReply, GatewayError> {
        self.requests.lock().await.push(request);

        self.script.lock().await.pop_front().unwrap_or_else(|| {
            Err(GatewayError::MalformedResponse(
                "script exhausted".to_string(),
            ))
        })
    }

    fn name(&self) -> &str {
        "ScriptedGateway"
    }
}

//! AnthropicGateway implementation using the Messages API.

use rag_core::{
    async_trait, GatewayError, GatewayRequest, LlmGateway, ModelReply, Role, ToolRequest,
    ToolSchema, Turn, TurnPayload,
};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::api_types::{
    ApiError, ApiMessage, ApiTool, ContentBlock, MessagesRequest, MessagesResponse, ToolChoice,
};
use crate::config::{ClaudeGatewayConfig, API_VERSION};

/// An [`LlmGateway`] backed by Claude over the Anthropic Messages API.
///
/// Holds no conversation state: each [`generate`](LlmGateway::generate) call
/// sends the full turn sequence it is given.
pub struct AnthropicGateway {
    client: Client,
    config: ClaudeGatewayConfig,
}

impl AnthropicGateway {
    /// Create a new gateway with the given configuration.
    pub fn new(config: ClaudeGatewayConfig) -> Result<Self, GatewayError> {
        if config.api_key.trim().is_empty() {
            return Err(GatewayError::Configuration("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                GatewayError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            "AnthropicGateway initialized with model: {}, max_tokens: {}",
            config.model, config.max_tokens
        );

        Ok(Self { client, config })
    }

    /// Create a gateway from environment variables.
    ///
    /// See [`ClaudeGatewayConfig::from_env`] for required environment variables.
    pub fn from_env() -> Result<Self, GatewayError> {
        let config = ClaudeGatewayConfig::from_env()?;
        Self::new(config)
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClaudeGatewayConfig {
        &self.config
    }

    /// Make a messages request to the Anthropic API.
    async fn send(&self, request: &MessagesRequest) -> Result<MessagesResponse, GatewayError> {
        let url = self.config.messages_url();

        debug!(
            "Sending request to Anthropic API: {} message(s), {} tool(s)",
            request.messages.len(),
            request.tools.as_ref().map_or(0, Vec::len)
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            // Try to parse as API error
            let message = match serde_json::from_str::<ApiError>(&error_text) {
                Ok(api_error) => api_error.error.message,
                Err(_) => error_text,
            };

            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: MessagesResponse = response.json().await.map_err(|e| {
            GatewayError::MalformedResponse(format!("Failed to parse response: {}", e))
        })?;

        debug!(
            "Received response {} from {}: stop_reason={:?}",
            body.id, body.model, body.stop_reason
        );

        if let Some(ref usage) = body.usage {
            debug!(
                "Token usage - input: {}, output: {}",
                usage.input_tokens, usage.output_tokens
            );
        }

        Ok(body)
    }
}

#[async_trait]
impl LlmGateway for AnthropicGateway {
    async fn generate(&self, request: GatewayRequest) -> Result<ModelReply, GatewayError> {
        let body = build_request(&self.config, &request);
        let response = self.send(&body).await?;
        parse_reply(response)
    }

    fn name(&self) -> &str {
        "AnthropicGateway"
    }
}

fn build_request(config: &ClaudeGatewayConfig, request: &GatewayRequest) -> MessagesRequest {
    let tools = request
        .tools
        .as_ref()
        .filter(|schemas| !schemas.is_empty())
        .map(|schemas| schemas.iter().map(to_api_tool).collect::<Vec<_>>());
    let tool_choice = tools.as_ref().map(|_| ToolChoice::auto());

    MessagesRequest {
        model: config.model.clone(),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        system: request.system_prompt.clone(),
        messages: request.turns.iter().map(to_api_message).collect(),
        tools,
        tool_choice,
    }
}

fn to_api_tool(schema: &ToolSchema) -> ApiTool {
    ApiTool {
        name: schema.name.clone(),
        description: schema.description.clone(),
        input_schema: schema.input_schema.clone(),
    }
}

fn to_api_message(turn: &Turn) -> ApiMessage {
    let content = match &turn.payload {
        TurnPayload::Text { text } => vec![ContentBlock::text(text.clone())],
        TurnPayload::ToolCalls { text, requests } => {
            let mut blocks = Vec::with_capacity(requests.len() + 1);
            // The API rejects empty text blocks
            if let Some(text) = text.as_ref().filter(|t| !t.trim().is_empty()) {
                blocks.push(ContentBlock::text(text.clone()));
            }
            blocks.extend(requests.iter().map(|request| ContentBlock::ToolUse {
                id: request.id.clone(),
                name: request.name.clone(),
                input: request.arguments.clone(),
            }));
            blocks
        }
        TurnPayload::ToolResults { results } => results
            .iter()
            .map(|result| ContentBlock::ToolResult {
                tool_use_id: result.tool_call_id.clone(),
                content: result.content.clone(),
            })
            .collect(),
    };

    match turn.role {
        Role::Assistant => ApiMessage::assistant(content),
        Role::User | Role::ToolResult => ApiMessage::user(content),
    }
}

fn parse_reply(response: MessagesResponse) -> Result<ModelReply, GatewayError> {
    let first_text = response.content.iter().find_map(|block| match block {
        ContentBlock::Text { text } => Some(text.clone()),
        _ => None,
    });

    if response.stop_reason.as_deref() == Some("tool_use") {
        let requests: Vec<ToolRequest> = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => {
                    Some(ToolRequest::new(id, name, input))
                }
                _ => None,
            })
            .collect();

        if requests.is_empty() {
            warn!("Response stopped for tool use but carried no tool_use blocks");
        }

        return Ok(ModelReply::ToolUse {
            text: first_text,
            requests,
        });
    }

    first_text.map(ModelReply::Text).ok_or_else(|| {
        GatewayError::MalformedResponse(format!(
            "no text content in response (stop_reason: {:?})",
            response.stop_reason
        ))
    })
}

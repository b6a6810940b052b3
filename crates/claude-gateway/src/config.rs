//! Configuration for AnthropicGateway.

use rag_core::GatewayError;
use std::env;
use std::time::Duration;

/// Default Messages API base URL.
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com";

/// Default model name.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Messages API version header value.
pub const API_VERSION: &str = "2023-06-01";

/// Configuration for AnthropicGateway.
#[derive(Debug, Clone)]
pub struct ClaudeGatewayConfig {
    /// Anthropic API URL.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Maximum tokens for response.
    pub max_tokens: u32,

    /// Temperature for generation (0.0 - 1.0).
    pub temperature: f32,

    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ClaudeGatewayConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 800,
            temperature: 0.0,
            timeout: Duration::from_secs(60),
        }
    }
}

impl ClaudeGatewayConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `ANTHROPIC_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `ANTHROPIC_API_URL` - API URL (default: https://api.anthropic.com)
    /// - `ANTHROPIC_MODEL` - Model name (default: claude-sonnet-4-20250514)
    /// - `ANTHROPIC_MAX_TOKENS` - Max tokens (default: 800)
    /// - `ANTHROPIC_TEMPERATURE` - Temperature (default: 0.0)
    /// - `ANTHROPIC_TIMEOUT_SECS` - Request timeout in seconds (default: 60)
    ///
    /// Unparseable numeric values fall back to their defaults.
    pub fn from_env() -> Result<Self, GatewayError> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GatewayError::Configuration("ANTHROPIC_API_KEY not set".to_string()))?;

        let defaults = Self::default();

        let api_url = env::var("ANTHROPIC_API_URL").unwrap_or(defaults.api_url);

        let model = env::var("ANTHROPIC_MODEL").unwrap_or(defaults.model);

        let max_tokens = env::var("ANTHROPIC_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_tokens);

        let temperature = env::var("ANTHROPIC_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.temperature);

        let timeout = env::var("ANTHROPIC_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Ok(Self {
            api_url,
            api_key,
            model,
            max_tokens,
            temperature,
            timeout,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> ClaudeGatewayConfigBuilder {
        ClaudeGatewayConfigBuilder::default()
    }

    /// Full URL of the messages endpoint.
    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.api_url.trim_end_matches('/'))
    }
}

/// Builder for ClaudeGatewayConfig.
#[derive(Debug, Default)]
pub struct ClaudeGatewayConfigBuilder {
    config: ClaudeGatewayConfig,
}

impl ClaudeGatewayConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = tokens;
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = temp;
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClaudeGatewayConfig {
        self.config
    }
}

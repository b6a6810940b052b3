//! Simple test for AnthropicGateway text generation.
//!
//! Run with: cargo run -p claude-gateway --example test_chat
//! Or with a custom message: cargo run -p claude-gateway --example test_chat -- "Your message here"
//!
//! Make sure to set environment variables in .env:
//!   ANTHROPIC_API_KEY - Anthropic API key for authentication

use claude_gateway::{AnthropicGateway, GatewayRequest, LlmGateway, ModelReply};
use rag_core::{prompt, Turn};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let message_text = if args.len() > 1 {
        args[1..].join(" ")
    } else {
        "Hello! Please respond with a short greeting.".to_string()
    };

    println!("Initializing AnthropicGateway...");
    let gateway = AnthropicGateway::from_env()?;

    println!("Gateway initialized: {}", gateway.name());
    println!("API URL: {}", gateway.config().api_url);
    println!("Model: {}", gateway.config().model);
    println!();

    let request = GatewayRequest::without_tools(
        prompt::system_prompt(None, prompt::DEFAULT_MAX_ROUNDS),
        vec![Turn::user(&message_text)],
    );

    println!("Sending: \"{}\"", message_text);
    println!("Waiting for response...\n");

    let reply = gateway.generate(request).await?;

    println!("=== Response ===");
    match reply {
        ModelReply::Text(text) => println!("{}", text),
        ModelReply::ToolUse { requests, .. } => {
            println!("(model asked for {} tool call(s))", requests.len())
        }
    }
    println!("================");

    Ok(())
}

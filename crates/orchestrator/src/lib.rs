//! Tool orchestration for the course-material assistant.
//!
//! This crate provides the [`Orchestrator`], which lets a language model
//! call course tools for a bounded number of rounds before it must answer,
//! and the [`CourseAssistant`] facade that adds prompt framing, session
//! history and source citations on top.
//!
//! # Architecture
//!
//! ```text
//! query + session id
//!          ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │                    COURSE ASSISTANT                      │
//! │                                                          │
//! │  1. Render session history (folded into system prompt)   │
//! │         ↓                                                │
//! │  2. Build a run-scoped tool registry                     │
//! │         ↓                                                │
//! │  3. Orchestrator loop:                                   │
//! │     • gateway call with tools offered                    │
//! │     • tool round → results appended as one turn          │
//! │     • repeat up to max_rounds, then answer without tools │
//! │         ↓                                                │
//! │  4. Collect provenance, then clear it                    │
//! │         ↓                                                │
//! │  5. Record the exchange in session history               │
//! └──────────────────────────────────────────────────────────┘
//!          ↓
//! answer + sources
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use claude_gateway::AnthropicGateway;
//! use orchestrator::{AssistantConfig, CourseAssistant};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = Arc::new(AnthropicGateway::from_env()?);
//!     let assistant = CourseAssistant::new(gateway, store, AssistantConfig::from_env());
//!
//!     let session = assistant.create_session();
//!     let answer = assistant.query("What is covered in lesson 1?", Some(&session)).await?;
//!
//!     println!("{}", answer.answer);
//!     for source in answer.sources {
//!         println!("  - {}", source.label);
//!     }
//!     Ok(())
//! }
//! ```

mod assistant;
mod config;
mod error;
mod orchestrator;

pub use assistant::{CourseAnalytics, CourseAssistant, QueryAnswer};
pub use config::AssistantConfig;
pub use error::OrchestratorError;
pub use orchestrator::{Orchestrator, DEFAULT_MAX_ROUNDS, FALLBACK_ANSWER};

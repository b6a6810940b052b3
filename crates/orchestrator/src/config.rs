//! Configuration for CourseAssistant.

use std::env;

use crate::orchestrator::DEFAULT_MAX_ROUNDS;

/// Configuration for CourseAssistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    /// Maximum tool rounds per query.
    pub max_rounds: usize,

    /// Exchanges of history kept per session.
    pub max_history: usize,

    /// Sessions tracked before the least recently used is evicted.
    pub max_sessions: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            max_history: 2,
            max_sessions: 10_000,
        }
    }
}

impl AssistantConfig {
    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `RAG_MAX_ROUNDS` - Max tool rounds per query (default: 2)
    /// - `RAG_MAX_HISTORY` - Exchanges remembered per session (default: 2)
    /// - `RAG_MAX_SESSIONS` - Sessions tracked before LRU eviction (default: 10000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_rounds: parse_var("RAG_MAX_ROUNDS").unwrap_or(defaults.max_rounds),
            max_history: parse_var("RAG_MAX_HISTORY").unwrap_or(defaults.max_history),
            max_sessions: parse_var("RAG_MAX_SESSIONS").unwrap_or(defaults.max_sessions),
        }
    }

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_max_history(mut self, exchanges: usize) -> Self {
        self.max_history = exchanges;
        self
    }

    pub fn with_max_sessions(mut self, sessions: usize) -> Self {
        self.max_sessions = sessions;
        self
    }
}

fn parse_var(name: &str) -> Option<usize> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AssistantConfig::default();
        assert_eq!(config.max_rounds, 2);
        assert_eq!(config.max_history, 2);
        assert_eq!(config.max_sessions, 10_000);
    }

    #[test]
    fn test_builder_methods() {
        let config = AssistantConfig::default()
            .with_max_rounds(3)
            .with_max_history(5)
            .with_max_sessions(10);
        assert_eq!(config.max_rounds, 3);
        assert_eq!(config.max_history, 5);
        assert_eq!(config.max_sessions, 10);
    }

    // Env vars are process-global, so every scenario runs under one lock.
    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        fn clear_all_rag_vars() {
            std::env::remove_var("RAG_MAX_ROUNDS");
            std::env::remove_var("RAG_MAX_HISTORY");
            std::env::remove_var("RAG_MAX_SESSIONS");
        }

        clear_all_rag_vars();
        assert_eq!(AssistantConfig::from_env(), AssistantConfig::default());

        std::env::set_var("RAG_MAX_ROUNDS", "4");
        std::env::set_var("RAG_MAX_HISTORY", " 6 ");
        std::env::set_var("RAG_MAX_SESSIONS", "100");
        let config = AssistantConfig::from_env();
        assert_eq!(config.max_rounds, 4);
        assert_eq!(config.max_history, 6);
        assert_eq!(config.max_sessions, 100);

        std::env::set_var("RAG_MAX_ROUNDS", "many");
        assert_eq!(AssistantConfig::from_env().max_rounds, 2);

        clear_all_rag_vars();
    }
}

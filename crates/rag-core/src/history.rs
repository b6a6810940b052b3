//! Per-session exchange history.
//!
//! History lives in memory only. It is folded into the system prompt of the
//! next run as context; it is never replayed as turns.

use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;
use tokio::sync::RwLock;

/// Default maximum number of sessions to track before LRU eviction.
const DEFAULT_MAX_SESSIONS: usize = 10000;

/// One user question and the answer it received.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Exchange {
    question: String,
    answer: String,
}

/// Per-session conversation history with LRU eviction.
///
/// Each session keeps at most `max_exchanges` question/answer pairs. Once
/// more than `max_sessions` sessions are tracked, the least recently used
/// one is dropped.
///
/// # Example
///
/// ```rust
/// use rag_core::SessionHistory;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let history = SessionHistory::new(2);
///     let session = history.create_session();
///
///     history.add_exchange(&session, "What is MCP?", "A protocol.").await;
///
///     let rendered = history.render(&session).await.unwrap();
///     assert_eq!(rendered, "User: What is MCP?\nAssistant: A protocol.");
/// }
/// ```
#[derive(Debug)]
pub struct SessionHistory {
    sessions: RwLock<IndexMap<String, Vec<Exchange>>>,
    max_exchanges: usize,
    max_sessions: usize,
    counter: AtomicUsize,
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new(2)
    }
}

impl SessionHistory {
    /// Create a history keeping `max_exchanges` exchanges per session.
    pub fn new(max_exchanges: usize) -> Self {
        Self::with_limits(max_exchanges, DEFAULT_MAX_SESSIONS)
    }

    /// Create a history with custom limits.
    pub fn with_limits(max_exchanges: usize, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(IndexMap::new()),
            max_exchanges,
            max_sessions,
            counter: AtomicUsize::new(0),
        }
    }

    /// Allocate a new, unique session identifier.
    pub fn create_session(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("session_{}", n)
    }

    /// Record a question and its answer.
    ///
    /// Marks the session as recently used and evicts the oldest session if
    /// the session limit is exceeded.
    pub async fn add_exchange(&self, session_id: &str, question: &str, answer: &str) {
        let mut sessions = self.sessions.write().await;

        let mut exchanges = sessions.shift_remove(session_id).unwrap_or_default();
        exchanges.push(Exchange {
            question: question.to_string(),
            answer: answer.to_string(),
        });

        if exchanges.len() > self.max_exchanges {
            let to_remove = exchanges.len() - self.max_exchanges;
            exchanges.drain(0..to_remove);
        }

        sessions.insert(session_id.to_string(), exchanges);

        while sessions.len() > self.max_sessions {
            sessions.shift_remove_index(0);
        }
    }

    /// Render a session's history for the system prompt.
    ///
    /// Returns `None` when the session is unknown or has no exchanges.
    pub async fn render(&self, session_id: &str) -> Option<String> {
        let mut sessions = self.sessions.write().await;

        // Move to end to mark as recently used
        let exchanges = sessions.shift_remove(session_id)?;
        let rendered = if exchanges.is_empty() {
            None
        } else {
            let lines: Vec<String> = exchanges
                .iter()
                .map(|e| format!("User: {}\nAssistant: {}", e.question, e.answer))
                .collect();
            Some(lines.join("\n"))
        };
        sessions.insert(session_id.to_string(), exchanges);

        rendered
    }

    /// Forget a session.
    pub async fn clear(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.shift_remove(session_id);
    }

    /// Forget every session.
    pub async fn clear_all(&self) {
        let mut sessions = self.sessions.write().await;
        sessions.clear();
    }

    /// Number of tracked sessions.
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}

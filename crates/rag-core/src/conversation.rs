//! The turn sequence exchanged with the model during one run.

use serde::{Deserialize, Serialize};

use crate::tools::{ToolRequest, ToolResult};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    ToolResult,
}

/// Content carried by a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnPayload {
    /// Plain text.
    Text { text: String },
    /// The model asked for tools, optionally with some text alongside.
    ToolCalls {
        text: Option<String>,
        requests: Vec<ToolRequest>,
    },
    /// Every result of one tool round.
    ToolResults { results: Vec<ToolResult> },
}

/// A single role-tagged turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub payload: TurnPayload,
}

impl Turn {
    /// A user text turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            payload: TurnPayload::Text { text: text.into() },
        }
    }

    /// An assistant text turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            payload: TurnPayload::Text { text: text.into() },
        }
    }

    /// An assistant turn requesting tool invocations.
    pub fn tool_calls(text: Option<String>, requests: Vec<ToolRequest>) -> Self {
        Self {
            role: Role::Assistant,
            payload: TurnPayload::ToolCalls { text, requests },
        }
    }

    /// A turn bundling all results of one tool round.
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self {
            role: Role::ToolResult,
            payload: TurnPayload::ToolResults { results },
        }
    }
}

/// Append-only conversation owned by a single orchestration run.
///
/// Turns can only be pushed, never edited or removed, so every gateway
/// call in a run sees a prefix-extension of the previous call's turns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Start a conversation with the user's query as its only turn.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::user(query)],
        }
    }

    /// Append a turn.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns so far, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the conversation has no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Copy of the turns for a gateway request.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conversation_starts_with_user_turn() {
        let conversation = Conversation::new("What is covered in lesson 1?");
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.turns()[0].role, Role::User);
    }

    #[test]
    fn test_conversation_grows_in_order() {
        let mut conversation = Conversation::new("query");
        let request = ToolRequest::new("toolu_1", "search_course_content", json!({"query": "x"}));
        conversation.push(Turn::tool_calls(None, vec![request]));
        conversation.push(Turn::tool_results(vec![ToolResult::new("toolu_1", "found")]));

        let roles: Vec<Role> = conversation.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::ToolResult]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut conversation = Conversation::new("query");
        let snapshot = conversation.snapshot();
        conversation.push(Turn::assistant("answer"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(conversation.len(), 2);
    }
}

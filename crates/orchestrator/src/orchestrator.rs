//! Round-bounded tool orchestration loop.

use std::sync::Arc;

use rag_core::prompt::{round_system_prompt, system_prompt};
use rag_core::{
    Conversation, GatewayError, GatewayRequest, LlmGateway, ModelReply, ToolExecutor, ToolSchema,
    Turn,
};
use tracing::{debug, info, warn};

use crate::error::OrchestratorError;

/// Answer returned when no usable text can be obtained from the model.
pub const FALLBACK_ANSWER: &str = "Unable to process response";

pub use rag_core::prompt::DEFAULT_MAX_ROUNDS;

/// Drives one query through at most `max_rounds` rounds of tool use.
///
/// Each run makes strictly sequential gateway calls:
///
/// ```text
/// first call (tools offered)
///   ├─ text ────────────────────────────────────────────► answer
///   └─ tool use → run round 1 → append results
///        ├─ round == max → final call (tools withdrawn) ─► answer
///        └─ next call (tools offered, round context)
///             ├─ text ──────────────────────────────────► answer
///             └─ tool use → run round 2 → ...
/// ```
///
/// A round whose batch cannot be dispatched ends the run at once with the
/// text of the last reply. Malformed replies yield [`FALLBACK_ANSWER`].
/// Transport and API failures are returned as [`OrchestratorError::Gateway`].
///
/// The orchestrator holds no per-run state and may serve concurrent runs.
pub struct Orchestrator {
    gateway: Arc<dyn LlmGateway>,
    max_rounds: usize,
}

/// Mutable state of a single run. Owned by the loop, never shared.
struct RunState {
    base_prompt: String,
    conversation: Conversation,
    round: usize,
}

impl RunState {
    fn new(query: &str, history: Option<&str>, max_rounds: usize) -> Self {
        Self {
            base_prompt: system_prompt(history, max_rounds),
            conversation: Conversation::new(query),
            round: 0,
        }
    }

    fn request(&self, system: String, tools: Option<Vec<ToolSchema>>) -> GatewayRequest {
        let turns = self.conversation.snapshot();
        match tools {
            Some(tools) => GatewayRequest::with_tools(system, turns, tools),
            None => GatewayRequest::without_tools(system, turns),
        }
    }
}

/// Text carried by a reply, or the fallback answer.
fn answer_text(reply: &ModelReply) -> String {
    reply.text().unwrap_or(FALLBACK_ANSWER).to_string()
}

impl Orchestrator {
    /// Create an orchestrator allowing [`DEFAULT_MAX_ROUNDS`] tool rounds.
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Set the maximum number of tool rounds.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// Name of the underlying gateway.
    pub fn gateway_name(&self) -> &str {
        self.gateway.name()
    }

    /// Answer `query`, optionally with rendered prior exchanges and tools.
    ///
    /// History is folded into the system prompt, never into the turns.
    pub async fn run(
        &self,
        query: &str,
        history: Option<&str>,
        tools: Option<&dyn ToolExecutor>,
    ) -> Result<String, OrchestratorError> {
        let mut state = RunState::new(query, history, self.max_rounds);
        let schemas = tools.map(|executor| executor.schemas());

        debug!(
            "Starting run with {} tool(s), max_rounds={}",
            schemas.as_ref().map_or(0, Vec::len),
            self.max_rounds
        );

        let first = state.request(state.base_prompt.clone(), schemas.clone());
        let Some(mut reply) = self.call(first).await? else {
            return Ok(FALLBACK_ANSWER.to_string());
        };

        let Some(executor) = tools else {
            return Ok(answer_text(&reply));
        };

        while state.round < self.max_rounds {
            let ModelReply::ToolUse { text, requests } = &reply else {
                break;
            };

            state.round += 1;
            info!(
                "Tool round {} of {}: {} request(s)",
                state.round,
                self.max_rounds,
                requests.len()
            );

            state
                .conversation
                .push(Turn::tool_calls(text.clone(), requests.clone()));

            let results = match executor.execute_batch(requests).await {
                Ok(results) => results,
                Err(e) => {
                    warn!("Tool round {} failed, ending run: {}", state.round, e);
                    return Ok(answer_text(&reply));
                }
            };

            state.conversation.push(Turn::tool_results(results));

            if state.round >= self.max_rounds {
                info!("Round limit reached, requesting final answer without tools");
                let last = state.request(state.base_prompt.clone(), None);
                return Ok(match self.call(last).await? {
                    Some(final_reply) => answer_text(&final_reply),
                    None => FALLBACK_ANSWER.to_string(),
                });
            }

            let system = round_system_prompt(&state.base_prompt, state.round, self.max_rounds);
            let next = state.request(system, schemas.clone());
            reply = match self.call(next).await? {
                Some(next_reply) => next_reply,
                None => return Ok(FALLBACK_ANSWER.to_string()),
            };

            if !reply.is_tool_use() {
                debug!("Model answered after {} round(s)", state.round);
            }
        }

        Ok(answer_text(&reply))
    }

    /// One gateway call. `None` means the reply was malformed.
    async fn call(&self, request: GatewayRequest) -> Result<Option<ModelReply>, OrchestratorError> {
        match self.gateway.generate(request).await {
            Ok(reply) => Ok(Some(reply)),
            Err(GatewayError::MalformedResponse(reason)) => {
                warn!("Malformed reply from {}: {}", self.gateway.name(), reason);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_tools::{course_registry, RegistryToolExecutor};
    use mock_collaborators::{ScriptedGateway, StaticStore};
    use rag_core::prompt::preamble;
    use rag_core::{
        async_trait, ChunkMetadata, ExecutionError, SearchHit, SearchResults, ToolRequest,
        ToolResult, TurnPayload,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Executor that answers every request with a fixed string and counts dispatches.
    struct CountingExecutor {
        dispatches: AtomicUsize,
        batches: AtomicUsize,
        fail: bool,
    }

    impl CountingExecutor {
        fn new() -> Self {
            Self {
                dispatches: AtomicUsize::new(0),
                batches: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl ToolExecutor for CountingExecutor {
        fn schemas(&self) -> Vec<ToolSchema> {
            vec![ToolSchema::new(
                "search_course_content",
                "Search course materials",
                json!({"type": "object", "properties": {"query": {"type": "string"}}, "required": ["query"]}),
            )]
        }

        async fn execute_batch(
            &self,
            requests: &[ToolRequest],
        ) -> Result<Vec<ToolResult>, ExecutionError> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ExecutionError::Dispatch {
                    tool: requests[0].name.clone(),
                    call_id: requests[0].id.clone(),
                    reason: "Missing required parameter: query".to_string(),
                });
            }
            Ok(requests
                .iter()
                .map(|r| {
                    self.dispatches.fetch_add(1, Ordering::SeqCst);
                    ToolResult::new(&r.id, format!("result for {}", r.id))
                })
                .collect())
        }
    }

    fn search(id: &str) -> ToolRequest {
        ToolRequest::new(id, "search_course_content", json!({"query": "q"}))
    }

    fn orchestrator(gateway: &Arc<ScriptedGateway>) -> Orchestrator {
        Orchestrator::new(gateway.clone())
    }

    #[tokio::test]
    async fn test_text_reply_is_returned_after_one_call() {
        let gateway = Arc::new(ScriptedGateway::new().then_text("Paris is the capital."));
        let executor = CountingExecutor::new();

        let answer = orchestrator(&gateway)
            .run("What is the capital of France?", None, Some(&executor))
            .await
            .unwrap();

        assert_eq!(answer, "Paris is the capital.");
        assert_eq!(gateway.call_count().await, 1);
        assert_eq!(executor.batches.load(Ordering::SeqCst), 0);

        let requests = gateway.requests().await;
        assert_eq!(requests[0].system_prompt, preamble(DEFAULT_MAX_ROUNDS));
        assert_eq!(requests[0].turns, vec![Turn::user("What is the capital of France?")]);
        assert!(requests[0].offers_tools());
    }

    #[tokio::test]
    async fn test_without_tools_no_schemas_are_offered() {
        let gateway = Arc::new(ScriptedGateway::new().then_text("Hello."));

        let answer = orchestrator(&gateway).run("Hi", None, None).await.unwrap();

        assert_eq!(answer, "Hello.");
        assert!(gateway.requests().await[0].tools.is_none());
    }

    #[tokio::test]
    async fn test_tool_use_without_executor_returns_reply_text() {
        let gateway = Arc::new(
            ScriptedGateway::new().then_tool_use_with_text("I would search.", vec![search("t1")]),
        );

        let answer = orchestrator(&gateway).run("q", None, None).await.unwrap();

        assert_eq!(answer, "I would search.");
        assert_eq!(gateway.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_history_is_folded_into_system_prompt() {
        let gateway = Arc::new(ScriptedGateway::new().then_text("Sure."));

        orchestrator(&gateway)
            .run("And lesson 2?", Some("User: What is MCP?\nAssistant: A protocol."), None)
            .await
            .unwrap();

        let request = &gateway.requests().await[0];
        assert!(request
            .system_prompt
            .ends_with("\n\nPrevious conversation:\nUser: What is MCP?\nAssistant: A protocol."));
        assert_eq!(request.turns, vec![Turn::user("And lesson 2?")]);
    }

    #[tokio::test]
    async fn test_max_rounds_ends_with_toolless_call() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .then_tool_use(vec![search("t1")])
                .then_tool_use(vec![search("t2")])
                .then_text("Final answer."),
        );
        let executor = CountingExecutor::new();

        let answer = orchestrator(&gateway)
            .run("Compare lessons", None, Some(&executor))
            .await
            .unwrap();

        assert_eq!(answer, "Final answer.");
        assert_eq!(gateway.call_count().await, 3);
        assert_eq!(executor.batches.load(Ordering::SeqCst), 2);

        let requests = gateway.requests().await;
        assert!(requests[0].offers_tools());
        assert!(requests[1].offers_tools());
        assert!(requests[1]
            .system_prompt
            .ends_with("Round 1 of 2: You can make additional tool calls if needed for complex queries requiring multiple searches or comparisons."));
        assert!(requests[2].tools.is_none());
        assert_eq!(requests[2].system_prompt, preamble(DEFAULT_MAX_ROUNDS));

        // user, calls, results, calls, results
        assert_eq!(requests[2].turns.len(), 5);
        for pair in requests.windows(2) {
            assert!(pair[1].turns.starts_with(&pair[0].turns));
        }
    }

    #[tokio::test]
    async fn test_final_call_ignores_further_tool_requests() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .then_tool_use(vec![search("t1")])
                .then_tool_use(vec![search("t2")])
                .then_tool_use_with_text("Still want tools", vec![search("t3")]),
        );
        let executor = CountingExecutor::new();

        let answer = orchestrator(&gateway)
            .run("q", None, Some(&executor))
            .await
            .unwrap();

        assert_eq!(answer, "Still want tools");
        assert_eq!(gateway.call_count().await, 3);
        assert_eq!(executor.batches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_round_dispatches_every_request_in_one_turn() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .then_tool_use(vec![search("t1"), search("t2"), search("t3")])
                .then_text("Done."),
        );
        let executor = CountingExecutor::new();

        orchestrator(&gateway)
            .run("q", None, Some(&executor))
            .await
            .unwrap();

        assert_eq!(executor.dispatches.load(Ordering::SeqCst), 3);

        let turns = &gateway.requests().await[1].turns;
        assert_eq!(turns.len(), 3);
        match &turns[2].payload {
            TurnPayload::ToolResults { results } => {
                let ids: Vec<&str> = results.iter().map(|r| r.tool_call_id.as_str()).collect();
                assert_eq!(ids, vec!["t1", "t2", "t3"]);
            }
            other => panic!("Expected tool results, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_early_termination_after_one_round() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .then_tool_use(vec![search("t1")])
                .then_text("One round was enough."),
        );
        let executor = CountingExecutor::new();

        let answer = orchestrator(&gateway)
            .run("q", None, Some(&executor))
            .await
            .unwrap();

        assert_eq!(answer, "One round was enough.");
        assert_eq!(gateway.call_count().await, 2);
        assert_eq!(executor.batches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_round_stops_without_further_calls() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .then_tool_use(vec![search("t1")])
                .then_text("never requested"),
        );
        let executor = CountingExecutor::failing();

        let answer = orchestrator(&gateway)
            .run("q", None, Some(&executor))
            .await
            .unwrap();

        assert_eq!(answer, FALLBACK_ANSWER);
        assert_eq!(gateway.call_count().await, 1);
        assert_eq!(gateway.remaining().await, 1);
    }

    #[tokio::test]
    async fn test_failed_round_keeps_reply_text() {
        let gateway = Arc::new(
            ScriptedGateway::new().then_tool_use_with_text("Let me check.", vec![search("t1")]),
        );
        let executor = CountingExecutor::failing();

        let answer = orchestrator(&gateway)
            .run("q", None, Some(&executor))
            .await
            .unwrap();

        assert_eq!(answer, "Let me check.");
    }

    #[tokio::test]
    async fn test_empty_round_is_a_failed_round() {
        let gateway = Arc::new(ScriptedGateway::new().then_tool_use(Vec::new()));
        let executor = RegistryToolExecutor::new(course_registry(Arc::new(StaticStore::new())).unwrap());

        let answer = orchestrator(&gateway)
            .run("q", None, Some(&executor))
            .await
            .unwrap();

        assert_eq!(answer, FALLBACK_ANSWER);
        assert_eq!(gateway.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_malformed_reply_yields_fallback() {
        let gateway = Arc::new(ScriptedGateway::new().then_error(GatewayError::MalformedResponse(
            "no text content".to_string(),
        )));

        let answer = orchestrator(&gateway).run("q", None, None).await.unwrap();
        assert_eq!(answer, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_malformed_final_reply_yields_fallback() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .then_tool_use(vec![search("t1")])
                .then_tool_use(vec![search("t2")]),
        );
        let executor = CountingExecutor::new();

        // Script runs dry on the final call, which reports a malformed reply
        let answer = orchestrator(&gateway)
            .run("q", None, Some(&executor))
            .await
            .unwrap();

        assert_eq!(answer, FALLBACK_ANSWER);
        assert_eq!(gateway.call_count().await, 3);
    }

    #[tokio::test]
    async fn test_gateway_failure_is_returned() {
        let gateway = Arc::new(ScriptedGateway::new().then_error(GatewayError::Api {
            status: 529,
            message: "Overloaded".to_string(),
        }));

        let result = orchestrator(&gateway).run("q", None, None).await;
        assert!(matches!(
            result,
            Err(OrchestratorError::Gateway(GatewayError::Api { status: 529, .. }))
        ));
    }

    #[tokio::test]
    async fn test_custom_round_limit() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .then_tool_use(vec![search("t1")])
                .then_tool_use(vec![search("t2")])
                .then_tool_use(vec![search("t3")])
                .then_text("After three rounds."),
        );
        let executor = CountingExecutor::new();
        let orchestrator = Orchestrator::new(gateway.clone()).with_max_rounds(3);

        let answer = orchestrator.run("q", None, Some(&executor)).await.unwrap();

        assert_eq!(answer, "After three rounds.");
        assert_eq!(gateway.call_count().await, 4);
        let requests = gateway.requests().await;
        assert!(requests[0].system_prompt.contains("At most 3 rounds of tool calls"));
        assert!(requests[2].system_prompt.contains("Round 2 of 3:"));
        assert!(requests[3].tools.is_none());
        assert_eq!(requests[3].system_prompt, preamble(3));
    }

    #[tokio::test]
    async fn test_lesson_one_scenario() {
        let store = Arc::new(
            StaticStore::new()
                .with_results(SearchResults::from_hits(vec![
                    SearchHit::new(
                        "This is an introduction to the course.",
                        ChunkMetadata::new("Test Course", Some(1)),
                        0.1,
                    ),
                    SearchHit::new(
                        "In this section, we dive deeper into the fundamentals.",
                        ChunkMetadata::new("Test Course", Some(1)),
                        0.15,
                    ),
                ]))
                .with_lesson_link("Test Course", 1, "https://example.com/lesson1"),
        );
        let executor = RegistryToolExecutor::new(course_registry(store).unwrap());
        let gateway = Arc::new(
            ScriptedGateway::new()
                .then_tool_use(vec![ToolRequest::new(
                    "toolu_1",
                    "search_course_content",
                    json!({"query": "lesson 1 content", "lesson_number": 1}),
                )])
                .then_text("Lesson 1 introduces the course and its fundamentals."),
        );

        let answer = orchestrator(&gateway)
            .run("What is covered in lesson 1?", None, Some(&executor))
            .await
            .unwrap();

        assert_eq!(answer, "Lesson 1 introduces the course and its fundamentals.");

        let sources = executor.latest_provenance().await;
        assert_eq!(sources.len(), 2);
        assert!(sources.iter().all(|s| s.label == "Test Course - Lesson 1"));

        let turns = &gateway.requests().await[1].turns;
        match &turns[2].payload {
            TurnPayload::ToolResults { results } => {
                assert!(results[0].content.starts_with("[Test Course - Lesson 1]\n"));
            }
            other => panic!("Expected tool results, got {:?}", other),
        }
    }
}

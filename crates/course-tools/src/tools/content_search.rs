//! Semantic search over course content.

use std::sync::Arc;

use async_trait::async_trait;
use rag_core::{RetrievalStore, SearchResults, ToolSchema};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::ToolError;
use crate::provenance::Provenance;
use crate::tool::{ProvenanceSource, Tool, ToolArgs, ToolOutput};

const PARAMS: &[&str] = &["query", "course_name", "lesson_number"];

/// Content search tool backed by a [`RetrievalStore`].
///
/// Renders each matched chunk under a `[<course> - Lesson <n>]` header and
/// reports one [`Provenance`] entry per chunk. Every execution reports a
/// source list, empty when nothing was found, so recording it replaces the
/// previous sources. [`run`](Tool::run) leaves the recording to the caller.
///
/// # Parameters
///
/// - `query` (required): What to search for
/// - `course_name` (optional): Course title; partial names are resolved by the store
/// - `lesson_number` (optional): Restrict to one lesson
///
/// # Examples
///
/// ```json
/// {"query": "prompt caching"}
/// {"query": "what is a server", "course_name": "MCP", "lesson_number": 3}
/// ```
pub struct ContentSearchTool {
    store: Arc<dyn RetrievalStore>,
    last_sources: RwLock<Vec<Provenance>>,
}

impl ContentSearchTool {
    pub fn new(store: Arc<dyn RetrievalStore>) -> Self {
        Self {
            store,
            last_sources: RwLock::new(Vec::new()),
        }
    }

    async fn format_results(&self, results: &SearchResults) -> (String, Vec<Provenance>) {
        let mut sections = Vec::with_capacity(results.len());
        let mut sources = Vec::with_capacity(results.len());

        for (document, meta) in results.iter() {
            let course_title = meta.course_title.as_deref().unwrap_or("unknown");
            let label = match meta.lesson_number {
                Some(n) => format!("{} - Lesson {}", course_title, n),
                None => course_title.to_string(),
            };

            let link = match meta.lesson_number {
                Some(n) => self
                    .store
                    .lesson_link(course_title, n)
                    .await
                    .filter(|link| !link.is_empty()),
                None => None,
            };

            sections.push(format!("[{}]\n{}", label, document));
            sources.push(Provenance::new(label, link));
        }

        (sections.join("\n\n"), sources)
    }
}

/// The message returned when a search matched nothing, naming active filters.
fn no_results_message(course_name: Option<&str>, lesson_number: Option<u32>) -> String {
    let mut filters = String::new();
    if let Some(course) = course_name {
        filters.push_str(&format!(" in course '{}'", course));
    }
    if let Some(lesson) = lesson_number {
        filters.push_str(&format!(" in lesson {}", lesson));
    }
    format!("No relevant content found{}.", filters)
}

#[async_trait]
impl Tool for ContentSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            "search_course_content",
            "Search course materials with smart course name matching and lesson filtering",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for in the course content"
                    },
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    },
                    "lesson_number": {
                        "type": "integer",
                        "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                    }
                },
                "required": ["query"]
            }),
        )
    }

    async fn execute(&self, args: ToolArgs) -> Result<String, ToolError> {
        let output = self.run(args).await?;
        if let Some(sources) = output.sources {
            self.record(sources).await;
        }
        Ok(output.content)
    }

    async fn run(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        args.ensure_known(PARAMS)?;
        let query = args.get_string("query")?;
        let course_name = args.get_string_opt("course_name")?;
        let lesson_number = args.get_u32_opt("lesson_number")?;

        debug!(
            "Searching course content: query='{}', course={:?}, lesson={:?}",
            query, course_name, lesson_number
        );

        let results = self
            .store
            .search(&query, course_name.as_deref(), lesson_number)
            .await;

        if let Some(error) = results.error() {
            return Ok(ToolOutput::cited(error, Vec::new()));
        }

        if results.is_empty() {
            return Ok(ToolOutput::cited(
                no_results_message(course_name.as_deref(), lesson_number),
                Vec::new(),
            ));
        }

        let (formatted, sources) = self.format_results(&results).await;
        debug!("Search matched {} chunk(s)", sources.len());

        Ok(ToolOutput::cited(formatted, sources))
    }

    fn provenance(&self) -> Option<&dyn ProvenanceSource> {
        Some(self)
    }
}

#[async_trait]
impl ProvenanceSource for ContentSearchTool {
    async fn latest(&self) -> Vec<Provenance> {
        self.last_sources.read().await.clone()
    }

    async fn record(&self, sources: Vec<Provenance>) {
        *self.last_sources.write().await = sources;
    }

    async fn clear(&self) {
        self.last_sources.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_collaborators::StaticStore;
    use rag_core::{ChunkMetadata, SearchHit};
    use serde_json::{json, Value};

    fn args(value: Value) -> ToolArgs {
        ToolArgs::from_value(&value).unwrap()
    }

    fn lesson_one_results() -> SearchResults {
        SearchResults::from_hits(vec![
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
        ])
    }

    #[test]
    fn test_schema() {
        let store = Arc::new(StaticStore::new());
        let schema = ContentSearchTool::new(store).schema();

        assert_eq!(schema.name, "search_course_content");
        assert_eq!(schema.input_schema["type"], "object");
        assert!(schema.input_schema["properties"]["query"].is_object());
        assert_eq!(schema.input_schema["required"], json!(["query"]));
    }

    #[tokio::test]
    async fn test_successful_search_formats_and_tracks_sources() {
        let store = Arc::new(
            StaticStore::new()
                .with_results(lesson_one_results())
                .with_lesson_link("Test Course", 1, "https://example.com/lesson1"),
        );
        let tool = ContentSearchTool::new(store.clone());

        let result = tool
            .execute(args(json!({"query": "what is covered in lesson 1?"})))
            .await
            .unwrap();

        assert_eq!(
            result,
            "[Test Course - Lesson 1]\nThis is an introduction to the course.\n\n\
             [Test Course - Lesson 1]\nIn this section, we dive deeper into the fundamentals."
        );

        let sources = tool.latest().await;
        assert_eq!(sources.len(), 2);
        assert!(sources.iter().all(|s| s.label == "Test Course - Lesson 1"));
        assert_eq!(
            sources[0].encode(),
            "Test Course - Lesson 1|https://example.com/lesson1"
        );

        let calls = store.search_calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].query, "what is covered in lesson 1?");
        assert_eq!(calls[0].course_name, None);
        assert_eq!(calls[0].lesson_number, None);
    }

    #[tokio::test]
    async fn test_filters_are_forwarded() {
        let store = Arc::new(StaticStore::new().with_results(lesson_one_results()));
        let tool = ContentSearchTool::new(store.clone());

        tool.execute(args(json!({"query": "q", "course_name": "MCP", "lesson_number": 2})))
            .await
            .unwrap();

        let calls = store.search_calls().await;
        assert_eq!(calls[0].course_name.as_deref(), Some("MCP"));
        assert_eq!(calls[0].lesson_number, Some(2));
    }

    #[tokio::test]
    async fn test_chunk_without_lesson_has_no_link() {
        let store = Arc::new(
            StaticStore::new()
                .with_results(SearchResults::from_hits(vec![SearchHit::new(
                    "Course overview.",
                    ChunkMetadata::new("Test Course", None),
                    0.3,
                )]))
                .with_lesson_link("Test Course", 1, "https://example.com/lesson1"),
        );
        let tool = ContentSearchTool::new(store);

        let result = tool.execute(args(json!({"query": "overview"}))).await.unwrap();

        assert_eq!(result, "[Test Course]\nCourse overview.");
        assert_eq!(tool.latest().await, vec![Provenance::new("Test Course", None)]);
    }

    #[tokio::test]
    async fn test_empty_lesson_link_is_dropped() {
        let store = Arc::new(
            StaticStore::new()
                .with_results(lesson_one_results())
                .with_lesson_link("Test Course", 1, ""),
        );
        let tool = ContentSearchTool::new(store);

        tool.execute(args(json!({"query": "lesson 1"}))).await.unwrap();

        let sources = tool.latest().await;
        assert_eq!(sources[0], Provenance::new("Test Course - Lesson 1", None));
        assert_eq!(sources[0].encode(), "Test Course - Lesson 1");
    }

    #[tokio::test]
    async fn test_run_reports_sources_without_recording() {
        let store = Arc::new(StaticStore::new().with_results(lesson_one_results()));
        let tool = ContentSearchTool::new(store);

        let output = tool.run(args(json!({"query": "lesson 1"}))).await.unwrap();

        assert_eq!(output.sources.map(|s| s.len()), Some(2));
        assert!(tool.latest().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_results() {
        let store = Arc::new(StaticStore::new());
        let tool = ContentSearchTool::new(store);

        let result = tool.execute(args(json!({"query": "nothing"}))).await.unwrap();
        assert_eq!(result, "No relevant content found.");
        assert!(tool.latest().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_results_name_filters() {
        let store = Arc::new(StaticStore::new());
        let tool = ContentSearchTool::new(store);

        let result = tool
            .execute(args(json!({
                "query": "anything",
                "course_name": "Nonexistent",
                "lesson_number": 5
            })))
            .await
            .unwrap();

        assert_eq!(
            result,
            "No relevant content found in course 'Nonexistent' in lesson 5."
        );
    }

    #[tokio::test]
    async fn test_store_error_is_returned_verbatim() {
        let store = Arc::new(
            StaticStore::new().with_results(SearchResults::failed("Database connection failed")),
        );
        let tool = ContentSearchTool::new(store);

        let result = tool.execute(args(json!({"query": "q"}))).await.unwrap();
        assert_eq!(result, "Database connection failed");
        assert!(tool.latest().await.is_empty());
    }

    #[tokio::test]
    async fn test_sources_are_replaced_not_accumulated() {
        let store = Arc::new(StaticStore::new().with_results(lesson_one_results()));
        let tool = ContentSearchTool::new(store.clone());

        tool.execute(args(json!({"query": "first"}))).await.unwrap();
        tool.execute(args(json!({"query": "second"}))).await.unwrap();
        assert_eq!(tool.latest().await.len(), 2);

        store.set_results(SearchResults::none()).await;
        tool.execute(args(json!({"query": "third"}))).await.unwrap();
        assert!(tool.latest().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_query_is_a_binding_error() {
        let tool = ContentSearchTool::new(Arc::new(StaticStore::new()));

        let missing = tool.execute(args(json!({"course_name": "MCP"}))).await;
        assert!(matches!(missing, Err(ToolError::MissingParameter(_))));

        let unexpected = tool
            .execute(args(json!({"query": "q", "lesson": 1})))
            .await;
        assert!(matches!(unexpected, Err(ToolError::UnexpectedParameter(_))));
    }
}

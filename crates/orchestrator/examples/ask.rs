//! Ask the course assistant a question against a local course catalog.
//!
//! Run with: cargo run -p orchestrator --example ask -- "What is covered in lesson 1?"
//! Use another catalog with: COURSE_CATALOG=path/to/catalog.json
//!
//! Make sure to set environment variables in .env:
//!   ANTHROPIC_API_KEY - Anthropic API key for authentication
//!
//! The catalog is a JSON array of courses, each with lessons carrying their
//! text in a `content` field. Search is plain keyword scoring; a vector
//! store would implement the same `RetrievalStore` trait.

use std::env;
use std::fs;
use std::sync::Arc;

use claude_gateway::AnthropicGateway;
use orchestrator::{AssistantConfig, CourseAssistant};
use rag_core::{
    async_trait, ChunkMetadata, CourseMetadata, LessonMetadata, RetrievalStore, SearchHit,
    SearchResults, StoreError,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

const DEFAULT_CATALOG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/examples/catalog.json");
const MAX_RESULTS: usize = 5;

#[derive(Deserialize)]
struct CatalogCourse {
    title: String,
    instructor: Option<String>,
    course_link: Option<String>,
    #[serde(default)]
    lessons: Vec<CatalogLesson>,
}

#[derive(Deserialize)]
struct CatalogLesson {
    lesson_number: u32,
    lesson_title: String,
    lesson_link: Option<String>,
    #[serde(default)]
    content: String,
}

struct Chunk {
    course_title: String,
    lesson_number: u32,
    text: String,
    text_lower: String,
}

/// Keyword-scored store over an in-memory catalog.
struct KeywordStore {
    courses: Vec<CourseMetadata>,
    chunks: Vec<Chunk>,
}

impl KeywordStore {
    fn load(path: &str) -> Result<Self, StoreError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", path, e)))?;
        let catalog: Vec<CatalogCourse> =
            serde_json::from_str(&raw).map_err(|e| StoreError::CorruptMetadata(e.to_string()))?;

        let mut courses = Vec::new();
        let mut chunks = Vec::new();
        for course in catalog {
            let mut metadata = CourseMetadata::new(&course.title);
            metadata.instructor = course.instructor;
            metadata.course_link = course.course_link;

            for lesson in course.lessons {
                let mut entry = LessonMetadata::new(lesson.lesson_number, lesson.lesson_title);
                entry.lesson_link = lesson.lesson_link;
                metadata.lessons.push(entry);

                for paragraph in lesson.content.split("\n\n").filter(|p| !p.trim().is_empty()) {
                    chunks.push(Chunk {
                        course_title: course.title.clone(),
                        lesson_number: lesson.lesson_number,
                        text: paragraph.trim().to_string(),
                        text_lower: paragraph.to_lowercase(),
                    });
                }
            }
            courses.push(metadata);
        }

        Ok(Self { courses, chunks })
    }
}

fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.len() > 2)
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl RetrievalStore for KeywordStore {
    async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> SearchResults {
        let course_title = match course_name {
            Some(name) => match self.resolve_course_name(name).await {
                Some(title) => Some(title),
                None => return SearchResults::failed(format!("No course found matching '{}'", name)),
            },
            None => None,
        };

        let tokens = tokenize(query);
        let mut scored: Vec<(usize, &Chunk)> = self
            .chunks
            .iter()
            .filter(|c| course_title.as_deref().map_or(true, |t| c.course_title == t))
            .filter(|c| lesson_number.map_or(true, |n| c.lesson_number == n))
            .map(|c| {
                let score = tokens
                    .iter()
                    .map(|t| c.text_lower.matches(t.as_str()).count())
                    .sum::<usize>();
                (score, c)
            })
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        SearchResults::from_hits(scored.into_iter().take(MAX_RESULTS).map(|(score, c)| {
            SearchHit::new(
                c.text.clone(),
                ChunkMetadata::new(c.course_title.clone(), Some(c.lesson_number)),
                1.0 / (1.0 + score as f32),
            )
        }))
    }

    async fn resolve_course_name(&self, course_name: &str) -> Option<String> {
        let needle = course_name.to_lowercase();
        self.courses
            .iter()
            .find(|c| c.title.to_lowercase().contains(&needle))
            .map(|c| c.title.clone())
    }

    async fn all_course_metadata(&self) -> Result<Vec<CourseMetadata>, StoreError> {
        Ok(self.courses.clone())
    }

    async fn lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String> {
        self.courses
            .iter()
            .find(|c| c.title == course_title)?
            .lessons
            .iter()
            .find(|l| l.lesson_number == Some(lesson_number))?
            .lesson_link
            .clone()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let question = if args.len() > 1 {
        args[1..].join(" ")
    } else {
        "What is covered in lesson 1 of the MCP course?".to_string()
    };

    let catalog = env::var("COURSE_CATALOG").unwrap_or_else(|_| DEFAULT_CATALOG.to_string());
    let store = Arc::new(KeywordStore::load(&catalog)?);
    let gateway = Arc::new(AnthropicGateway::from_env()?);
    let assistant = CourseAssistant::new(gateway, store, AssistantConfig::from_env());

    let analytics = assistant.course_analytics().await?;
    println!("Catalog: {} course(s)", analytics.total_courses);
    for title in &analytics.course_titles {
        println!("  - {}", title);
    }
    println!();

    let session = assistant.create_session();
    println!("Asking: \"{}\"", question);
    println!("Waiting for response...\n");

    let answer = assistant.query(&question, Some(&session)).await?;

    println!("=== Answer ===");
    println!("{}", answer.answer);
    println!("==============");

    if !answer.sources.is_empty() {
        println!("\nSources:");
        for source in &answer.sources {
            match &source.link {
                Some(link) => println!("  - {} ({})", source.label, link),
                None => println!("  - {}", source.label),
            }
        }
    }

    Ok(())
}

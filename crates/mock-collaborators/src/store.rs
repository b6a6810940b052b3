//! In-memory retrieval store with canned answers.

use std::collections::HashMap;
use std::time::Duration;

use rag_core::{async_trait, CourseMetadata, RetrievalStore, SearchResults, StoreError};
use tokio::sync::RwLock;
use tokio::time::sleep;

/// Arguments of one recorded `search` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCall {
    pub query: String,
    pub course_name: Option<String>,
    pub lesson_number: Option<u32>,
}

/// A store that returns canned search results.
///
/// Course metadata, lesson links and search results are fixed up front
/// with the `with_*` builders. Queries registered with
/// [`with_query_results`](StaticStore::with_query_results) get their own
/// results and every other query gets the shared ones, which can be
/// swapped later with [`set_results`](StaticStore::set_results).
/// [`with_query_delay`](StaticStore::with_query_delay) slows down one query
/// so concurrent searches finish out of order.
#[derive(Debug, Default)]
pub struct StaticStore {
    results: RwLock<SearchResults>,
    query_results: HashMap<String, SearchResults>,
    query_delays: HashMap<String, Duration>,
    courses: Vec<CourseMetadata>,
    metadata_error: Option<StoreError>,
    lesson_links: HashMap<(String, u32), String>,
    calls: RwLock<Vec<SearchCall>>,
}

impl StaticStore {
    /// An empty catalog that finds nothing.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, results: SearchResults) -> Self {
        *self.results.get_mut() = results;
        self
    }

    /// Answer `query` with `results` instead of the shared results.
    pub fn with_query_results(mut self, query: impl Into<String>, results: SearchResults) -> Self {
        self.query_results.insert(query.into(), results);
        self
    }

    /// Sleep for `delay` before answering `query`.
    pub fn with_query_delay(mut self, query: impl Into<String>, delay: Duration) -> Self {
        self.query_delays.insert(query.into(), delay);
        self
    }

    pub fn with_courses(mut self, courses: Vec<CourseMetadata>) -> Self {
        self.courses = courses;
        self
    }

    /// Make every metadata lookup fail with `error`.
    pub fn with_metadata_error(mut self, error: StoreError) -> Self {
        self.metadata_error = Some(error);
        self
    }

    pub fn with_lesson_link(
        mut self,
        course_title: impl Into<String>,
        lesson_number: u32,
        link: impl Into<String>,
    ) -> Self {
        self.lesson_links
            .insert((course_title.into(), lesson_number), link.into());
        self
    }

    /// Replace the canned search results.
    pub async fn set_results(&self, results: SearchResults) {
        *self.results.write().await = results;
    }

    /// Every `search` call received so far, in order.
    pub async fn search_calls(&self) -> Vec<SearchCall> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl RetrievalStore for StaticStore {
    async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> SearchResults {
        self.calls.write().await.push(SearchCall {
            query: query.to_string(),
            course_name: course_name.map(str::to_string),
            lesson_number,
        });

        if let Some(delay) = self.query_delays.get(query) {
            sleep(*delay).await;
        }

        match self.query_results.get(query) {
            Some(results) => results.clone(),
            None => self.results.read().await.clone(),
        }
    }

    async fn resolve_course_name(&self, course_name: &str) -> Option<String> {
        let needle = course_name.to_lowercase();
        self.courses
            .iter()
            .find(|course| course.title.to_lowercase().contains(&needle))
            .map(|course| course.title.clone())
    }

    async fn all_course_metadata(&self) -> Result<Vec<CourseMetadata>, StoreError> {
        match &self.metadata_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.courses.clone()),
        }
    }

    async fn lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String> {
        self.lesson_links
            .get(&(course_title.to_string(), lesson_number))
            .cloned()
    }
}

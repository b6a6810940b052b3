//! The retrieval store contract.
//!
//! The store performs semantic search over course chunks and exact lookups
//! over course metadata. How text is embedded and how similarity is scored
//! are the store's business; this module only fixes the shapes exchanged.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Metadata attached to one stored content chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub course_title: Option<String>,
    pub lesson_number: Option<u32>,
    pub chunk_index: Option<u32>,
}

impl ChunkMetadata {
    /// Metadata for a chunk of the given course and lesson.
    pub fn new(course_title: impl Into<String>, lesson_number: Option<u32>) -> Self {
        Self {
            course_title: Some(course_title.into()),
            lesson_number,
            chunk_index: None,
        }
    }
}

/// One matched chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub document: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

impl SearchHit {
    pub fn new(document: impl Into<String>, metadata: ChunkMetadata, distance: f32) -> Self {
        Self {
            document: document.into(),
            metadata,
            distance,
        }
    }
}

/// Results of a search: parallel document/metadata/distance columns, or an error.
///
/// The columns always have equal length, and an error is only ever carried
/// by an empty result set. Both hold by construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    documents: Vec<String>,
    metadata: Vec<ChunkMetadata>,
    distances: Vec<f32>,
    error: Option<String>,
}

impl SearchResults {
    /// Build results from matched hits, in rank order.
    pub fn from_hits(hits: impl IntoIterator<Item = SearchHit>) -> Self {
        let mut results = Self::default();
        for hit in hits {
            results.documents.push(hit.document);
            results.metadata.push(hit.metadata);
            results.distances.push(hit.distance);
        }
        results
    }

    /// An empty result set with no error.
    pub fn none() -> Self {
        Self::default()
    }

    /// An empty result set carrying an error message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn metadata(&self) -> &[ChunkMetadata] {
        &self.metadata
    }

    pub fn distances(&self) -> &[f32] {
        &self.distances
    }

    /// The store-reported error, if the search failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True iff no document matched.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Iterate over `(document, metadata)` pairs in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChunkMetadata)> {
        self.documents
            .iter()
            .map(String::as_str)
            .zip(self.metadata.iter())
    }
}

/// One lesson entry of a course.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonMetadata {
    pub lesson_number: Option<u32>,
    pub lesson_title: Option<String>,
    pub lesson_link: Option<String>,
}

impl LessonMetadata {
    pub fn new(number: u32, title: impl Into<String>) -> Self {
        Self {
            lesson_number: Some(number),
            lesson_title: Some(title.into()),
            lesson_link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.lesson_link = Some(link.into());
        self
    }
}

/// Catalog entry for a course. Owned by the ingestion pipeline; read-only here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseMetadata {
    pub title: String,
    pub instructor: Option<String>,
    pub course_link: Option<String>,
    #[serde(default)]
    pub lessons: Vec<LessonMetadata>,
}

impl CourseMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_instructor(mut self, instructor: impl Into<String>) -> Self {
        self.instructor = Some(instructor.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.course_link = Some(link.into());
        self
    }

    pub fn with_lesson(mut self, lesson: LessonMetadata) -> Self {
        self.lessons.push(lesson);
        self
    }
}

/// Semantic search and metadata lookup over stored course material.
#[async_trait]
pub trait RetrievalStore: Send + Sync {
    /// Search chunks, optionally filtered by course and lesson.
    ///
    /// Filters combine conjunctively. A course filter is first resolved to
    /// an exact stored title; if that fails the whole search fails with
    /// `No course found matching '<name>'`. Failures are reported through
    /// [`SearchResults::error`] rather than as `Err`.
    async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> SearchResults;

    /// Resolve a fuzzy course name to an exact stored title.
    async fn resolve_course_name(&self, course_name: &str) -> Option<String>;

    /// Every course in the catalog, in store iteration order.
    async fn all_course_metadata(&self) -> Result<Vec<CourseMetadata>, StoreError>;

    /// Deep link for one lesson, if the catalog has one.
    async fn lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String>;

    /// Titles of every course in the catalog.
    async fn course_titles(&self) -> Result<Vec<String>, StoreError> {
        let courses = self.all_course_metadata().await?;
        Ok(courses.into_iter().map(|course| course.title).collect())
    }
}

//! Course outline lookup.

use std::sync::Arc;

use async_trait::async_trait;
use rag_core::{CourseMetadata, RetrievalStore, ToolSchema};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs};

const PARAMS: &[&str] = &["course_title"];

/// Returns a course's title, instructor, link and numbered lesson list.
///
/// Course matching is case-insensitive: an exact title match wins, then the
/// first title that contains, or is contained in, the requested name.
pub struct OutlineTool {
    store: Arc<dyn RetrievalStore>,
}

impl OutlineTool {
    pub fn new(store: Arc<dyn RetrievalStore>) -> Self {
        Self { store }
    }
}

fn find_best_match<'a>(
    requested: &str,
    courses: &'a [CourseMetadata],
) -> Option<&'a CourseMetadata> {
    let needle = requested.to_lowercase();

    courses
        .iter()
        .find(|course| course.title.to_lowercase() == needle)
        .or_else(|| {
            courses.iter().find(|course| {
                let title = course.title.to_lowercase();
                title.contains(&needle) || needle.contains(&title)
            })
        })
}

fn format_outline(course: &CourseMetadata) -> String {
    let mut outline = format!("**{}**\n\n", course.title);

    if let Some(instructor) = course.instructor.as_deref().filter(|s| !s.is_empty()) {
        outline.push_str(&format!("**Instructor:** {}\n", instructor));
    }

    if let Some(link) = course.course_link.as_deref().filter(|s| !s.is_empty()) {
        // Code span keeps chat clients from auto-linking
        let bare = link.replace("https://", "").replace("http://", "");
        outline.push_str(&format!("**Course URL:** `{}`\n", bare));
    }

    outline.push_str("\n**Course Lessons:**\n");

    if course.lessons.is_empty() {
        outline.push_str("No lessons found for this course.\n");
        return outline;
    }

    let mut lessons: Vec<_> = course.lessons.iter().collect();
    lessons.sort_by_key(|lesson| lesson.lesson_number.unwrap_or(0));

    for lesson in lessons {
        if let (Some(number), Some(title)) = (
            lesson.lesson_number,
            lesson.lesson_title.as_deref().filter(|s| !s.is_empty()),
        ) {
            outline.push_str(&format!("{}. {}\n", number, title));
        }
    }

    outline
}

#[async_trait]
impl Tool for OutlineTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            "get_course_outline",
            "Get complete course outline including course title, link, and all lessons",
            json!({
                "type": "object",
                "properties": {
                    "course_title": {
                        "type": "string",
                        "description": "Course title to get outline for (partial matches work, e.g. 'MCP', 'Introduction')"
                    }
                },
                "required": ["course_title"]
            }),
        )
    }

    async fn execute(&self, args: ToolArgs) -> Result<String, ToolError> {
        args.ensure_known(PARAMS)?;
        let course_title = args.get_string("course_title")?;

        debug!("Looking up outline for '{}'", course_title);

        let courses = match self.store.all_course_metadata().await {
            Ok(courses) => courses,
            Err(e) => {
                warn!("Course catalog lookup failed: {}", e);
                return Ok(format!("Error retrieving course outline: {}", e));
            }
        };

        if courses.is_empty() {
            return Ok("No courses found in the database.".to_string());
        }

        match find_best_match(&course_title, &courses) {
            Some(course) => Ok(format_outline(course)),
            None => {
                let available: Vec<&str> = courses.iter().map(|c| c.title.as_str()).collect();
                Ok(format!(
                    "No course found matching '{}'. Available courses: {}",
                    course_title,
                    available.join(", ")
                ))
            }
        }
    }
}

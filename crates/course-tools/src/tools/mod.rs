//! Course retrieval tools.

mod content_search;
mod course_outline;

pub use content_search::ContentSearchTool;
pub use course_outline::OutlineTool;

//! Course domain models

use serde::{Deserialize, Serialize};

/// A single lesson within a course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub lesson_number: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_link: Option<String>,
}

/// Course metadata parsed from a transcript document.
/// Titles are unique and serve as the catalog key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Course {
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }
}

/// A chunk of course text ready for indexing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseChunk {
    pub content: String,
    pub course_title: String,
    pub lesson_number: Option<i64>,
    pub chunk_index: usize,
}

/// A ranked content match from the course index
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub content: String,
    pub course_title: String,
    pub lesson_number: Option<i64>,
    /// BM25 relevance score (negative, more negative = better match)
    pub score: f64,
}

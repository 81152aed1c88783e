//! Course transcript parsing and chunking
//!
//! Transcript files start with a short header:
//!
//! ```text
//! Course Title: Building Towards Computer Use with Anthropic
//! Course Link: https://example.com/course
//! Course Instructor: Colt Steele
//! ```
//!
//! followed by lesson sections introduced by "Lesson N: Title" markers, each
//! optionally followed by a "Lesson Link:" line. Lesson text is split into
//! sentence-packed chunks with a small overlap carried between chunks.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

use crate::models::{Course, CourseChunk, Lesson};

static LESSON_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Lesson\s+(\d+):\s*(.+)$").unwrap());
static LESSON_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Lesson Link:\s*(\S+)").unwrap());
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

pub struct DocumentProcessor {
    chunk_size: usize,
    chunk_overlap: usize,
}

struct LessonSection {
    number: Option<i64>,
    title: String,
    link: Option<String>,
    lines: Vec<String>,
}

impl DocumentProcessor {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        DocumentProcessor {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Parse a transcript file into course metadata and indexed chunks
    pub fn process_course_document(
        &self,
        file_path: &Path,
    ) -> Result<(Course, Vec<CourseChunk>), String> {
        let raw = fs::read(file_path)
            .map_err(|e| format!("Failed to read {}: {}", file_path.display(), e))?;
        let text = String::from_utf8_lossy(&raw);

        let mut title: Option<String> = None;
        let mut course_link: Option<String> = None;
        let mut instructor: Option<String> = None;
        let mut sections: Vec<LessonSection> = Vec::new();

        for line in text.lines() {
            let line = line.trim();

            if let Some(caps) = LESSON_MARKER.captures(line) {
                let number = caps[1].parse::<i64>().ok();
                sections.push(LessonSection {
                    number,
                    title: caps[2].trim().to_string(),
                    link: None,
                    lines: Vec::new(),
                });
                continue;
            }

            if let Some(section) = sections.last_mut() {
                // A link line directly after the marker belongs to the lesson
                if section.lines.is_empty() && section.link.is_none() {
                    if let Some(caps) = LESSON_LINK.captures(line) {
                        section.link = Some(caps[1].to_string());
                        continue;
                    }
                }
                if !line.is_empty() {
                    section.lines.push(line.to_string());
                }
                continue;
            }

            // Header area, before any lesson marker
            if let Some(value) = line.strip_prefix("Course Title:") {
                title = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("Course Link:") {
                course_link = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("Course Instructor:") {
                instructor = Some(value.trim().to_string());
            } else if !line.is_empty() {
                // Documents without lesson markers are indexed as one
                // unnumbered section
                if sections.is_empty() {
                    sections.push(LessonSection {
                        number: None,
                        title: String::new(),
                        link: None,
                        lines: Vec::new(),
                    });
                }
                if let Some(section) = sections.last_mut() {
                    section.lines.push(line.to_string());
                }
            }
        }

        let title = title.unwrap_or_else(|| {
            file_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Unknown Course".to_string())
        });

        let lessons: Vec<Lesson> = sections
            .iter()
            .filter_map(|s| {
                s.number.map(|number| Lesson {
                    lesson_number: number,
                    title: s.title.clone(),
                    lesson_link: s.link.clone(),
                })
            })
            .collect();

        let course = Course {
            title: title.clone(),
            course_link,
            instructor,
            lessons,
        };

        let mut chunks = Vec::new();
        for section in &sections {
            let section_text = section.lines.join(" ");
            for piece in self.chunk_text(&section_text) {
                let content = match section.number {
                    Some(number) => {
                        format!("Course {} Lesson {} content: {}", title, number, piece)
                    }
                    None => format!("Course {} content: {}", title, piece),
                };
                chunks.push(CourseChunk {
                    content,
                    course_title: title.clone(),
                    lesson_number: section.number,
                    chunk_index: chunks.len(),
                });
            }
        }

        Ok((course, chunks))
    }

    /// Split text into chunks of up to `chunk_size` characters on sentence
    /// boundaries, carrying up to `chunk_overlap` characters of trailing
    /// sentences into the next chunk.
    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Vec::new();
        }

        let mut chunks: Vec<String> = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_len = 0usize;

        for sentence in sentences {
            let sentence_len = sentence.chars().count();
            let sep = if current.is_empty() { 0 } else { 1 };

            if !current.is_empty() && current_len + sep + sentence_len > self.chunk_size {
                chunks.push(current.join(" "));

                let mut overlap: Vec<String> = Vec::new();
                let mut overlap_len = 0usize;
                for prev in current.iter().rev() {
                    let prev_len = prev.chars().count();
                    let osep = if overlap.is_empty() { 0 } else { 1 };
                    if overlap_len + osep + prev_len > self.chunk_overlap {
                        break;
                    }
                    overlap_len += osep + prev_len;
                    overlap.push(prev.clone());
                }
                overlap.reverse();
                current_len = overlap_len;
                current = overlap;
            }

            let sep = if current.is_empty() { 0 } else { 1 };
            current_len += sep + sentence_len;
            current.push(sentence);
        }

        if !current.is_empty() {
            chunks.push(current.join(" "));
        }
        chunks
    }
}

/// Split on sentence terminators, keeping the terminator with its sentence
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_END.find_iter(text) {
        let end = m.start() + 1;
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = m.end();
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_DOC: &str = "\
Course Title: Building Towards Computer Use with Anthropic
Course Link: https://example.com/computer-use
Course Instructor: Colt Steele

Lesson 0: Introduction
Lesson Link: https://example.com/lesson/0
Welcome to Building Toward Computer Use with Anthropic. This course teaches you about computer use.

Lesson 1: API Basics
Anthropic provides an API to interact with Claude. You need an API key to make requests.
";

    fn write_doc(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_course_header() {
        let file = write_doc(SAMPLE_DOC);
        let processor = DocumentProcessor::new(800, 100);
        let (course, _) = processor.process_course_document(file.path()).unwrap();

        assert_eq!(course.title, "Building Towards Computer Use with Anthropic");
        assert_eq!(
            course.course_link.as_deref(),
            Some("https://example.com/computer-use")
        );
        assert_eq!(course.instructor.as_deref(), Some("Colt Steele"));
    }

    #[test]
    fn test_parse_lessons_and_links() {
        let file = write_doc(SAMPLE_DOC);
        let processor = DocumentProcessor::new(800, 100);
        let (course, _) = processor.process_course_document(file.path()).unwrap();

        assert_eq!(course.lessons.len(), 2);
        assert_eq!(course.lessons[0].lesson_number, 0);
        assert_eq!(course.lessons[0].title, "Introduction");
        assert_eq!(
            course.lessons[0].lesson_link.as_deref(),
            Some("https://example.com/lesson/0")
        );
        assert_eq!(course.lessons[1].lesson_number, 1);
        assert!(course.lessons[1].lesson_link.is_none());
    }

    #[test]
    fn test_chunks_carry_course_and_lesson_context() {
        let file = write_doc(SAMPLE_DOC);
        let processor = DocumentProcessor::new(800, 100);
        let (_, chunks) = processor.process_course_document(file.path()).unwrap();

        assert!(!chunks.is_empty());
        assert!(chunks[0].content.starts_with(
            "Course Building Towards Computer Use with Anthropic Lesson 0 content:"
        ));
        assert_eq!(chunks[0].lesson_number, Some(0));
        // Chunk indexes are global across the document
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
        }
    }

    #[test]
    fn test_title_falls_back_to_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("untitled_course.txt");
        std::fs::write(&path, "Just some content without headers. More text here.").unwrap();

        let processor = DocumentProcessor::new(800, 100);
        let (course, chunks) = processor.process_course_document(&path).unwrap();

        assert_eq!(course.title, "untitled_course");
        assert!(course.lessons.is_empty());
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].content.starts_with("Course untitled_course content:"));
        assert_eq!(chunks[0].lesson_number, None);
    }

    #[test]
    fn test_chunk_text_respects_size() {
        let processor = DocumentProcessor::new(50, 0);
        let text = "First sentence here. Second sentence follows. Third one now. Fourth and last.";
        let chunks = processor.chunk_text(text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            // Single sentences longer than the budget are kept whole, these are not
            assert!(chunk.chars().count() <= 50);
        }
    }

    #[test]
    fn test_chunk_text_overlap_repeats_trailing_sentence() {
        let processor = DocumentProcessor::new(50, 25);
        let text = "First sentence here. Second sentence follows. Third one now.";
        let chunks = processor.chunk_text(text);

        assert!(chunks.len() >= 2);
        let last_of_first = chunks[0].rsplit(". ").next().unwrap();
        assert!(chunks[1].contains(last_of_first.trim_end_matches('.')));
    }

    #[test]
    fn test_chunk_text_empty() {
        let processor = DocumentProcessor::new(800, 100);
        assert!(processor.chunk_text("").is_empty());
        assert!(processor.chunk_text("   ").is_empty());
    }
}

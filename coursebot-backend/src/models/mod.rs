pub mod course;

pub use course::{Course, CourseChunk, Lesson, SearchHit};

pub mod get_course_outline;
pub mod search_course_content;

pub use get_course_outline::CourseOutlineTool;
pub use search_course_content::CourseSearchTool;

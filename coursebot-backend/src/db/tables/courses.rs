//! Course catalog database operations

use chrono::Utc;
use rusqlite::Result as SqliteResult;
use std::collections::HashSet;

use super::super::{fts_match_expr, Database};
use crate::models::{Course, Lesson};

impl Database {
    /// Upsert a course catalog entry and keep its title index row in sync
    pub fn add_course_metadata(&self, course: &Course) -> SqliteResult<()> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        let lessons_json =
            serde_json::to_string(&course.lessons).unwrap_or_else(|_| "[]".to_string());

        conn.execute(
            "INSERT OR REPLACE INTO courses (title, instructor, course_link, lessons_json, lesson_count, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                course.title,
                course.instructor,
                course.course_link,
                lessons_json,
                course.lessons.len() as i64,
                now
            ],
        )?;

        conn.execute("DELETE FROM courses_fts WHERE title = ?1", [&course.title])?;
        conn.execute("INSERT INTO courses_fts (title) VALUES (?1)", [&course.title])?;

        Ok(())
    }

    /// Resolve a partial course name to the full catalog title.
    ///
    /// Exact titles win; otherwise the best BM25 title match is returned,
    /// so "Computer Use" resolves to "Building Towards Computer Use with
    /// Anthropic". Returns None when nothing in the catalog overlaps.
    pub fn resolve_course_name(&self, course_name: &str) -> SqliteResult<Option<String>> {
        let conn = self.conn();

        let exact: Option<String> = conn
            .query_row(
                "SELECT title FROM courses WHERE title = ?1",
                [course_name],
                |row| row.get(0),
            )
            .ok();
        if exact.is_some() {
            return Ok(exact);
        }

        let match_expr = match fts_match_expr(course_name) {
            Some(expr) => expr,
            None => return Ok(None),
        };

        let mut stmt = conn.prepare(
            "SELECT title FROM courses_fts WHERE courses_fts MATCH ?1 ORDER BY bm25(courses_fts) LIMIT 1",
        )?;
        let title = stmt.query_row([&match_expr], |row| row.get(0)).ok();
        Ok(title)
    }

    /// Fetch a course (with parsed lessons) by exact or partial name
    pub fn get_course_by_name(&self, course_name: &str) -> SqliteResult<Option<Course>> {
        let title = match self.resolve_course_name(course_name)? {
            Some(t) => t,
            None => return Ok(None),
        };

        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT title, instructor, course_link, lessons_json FROM courses WHERE title = ?1",
        )?;
        let course = stmt
            .query_row([&title], |row| {
                let lessons_json: String = row.get(3)?;
                Ok(Course {
                    title: row.get(0)?,
                    instructor: row.get(1)?,
                    course_link: row.get(2)?,
                    lessons: serde_json::from_str(&lessons_json).unwrap_or_default(),
                })
            })
            .ok();
        Ok(course)
    }

    /// Link for a specific lesson of a course (exact title)
    pub fn get_lesson_link(
        &self,
        course_title: &str,
        lesson_number: i64,
    ) -> SqliteResult<Option<String>> {
        let conn = self.conn();
        let lessons_json: Option<String> = conn
            .query_row(
                "SELECT lessons_json FROM courses WHERE title = ?1",
                [course_title],
                |row| row.get(0),
            )
            .ok();

        let lessons: Vec<Lesson> = match lessons_json {
            Some(json) => serde_json::from_str(&json).unwrap_or_default(),
            None => return Ok(None),
        };

        Ok(lessons
            .into_iter()
            .find(|l| l.lesson_number == lesson_number)
            .and_then(|l| l.lesson_link))
    }

    pub fn get_course_count(&self) -> SqliteResult<i64> {
        let conn = self.conn();
        conn.query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))
    }

    pub fn get_course_titles(&self) -> SqliteResult<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT title FROM courses ORDER BY title")?;
        let titles = stmt
            .query_map([], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(titles)
    }

    /// Titles already indexed, as a set for ingestion skip checks
    pub fn get_existing_course_titles(&self) -> SqliteResult<HashSet<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT title FROM courses")?;
        let titles = stmt
            .query_map([], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(titles)
    }

    /// Delete all catalog and content data
    pub fn clear_all(&self) -> SqliteResult<()> {
        let conn = self.conn();
        conn.execute_batch(
            "DELETE FROM courses;
             DELETE FROM courses_fts;
             DELETE FROM chunks;
             DELETE FROM chunks_fts;",
        )
    }
}

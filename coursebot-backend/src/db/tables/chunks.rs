//! Course content chunk database operations

use rusqlite::Result as SqliteResult;

use super::super::{fts_match_expr, Database};
use crate::models::{CourseChunk, SearchHit};

impl Database {
    /// Append content chunks and their full-text index rows
    pub fn add_course_content(&self, chunks: &[CourseChunk]) -> SqliteResult<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        for chunk in chunks {
            tx.execute(
                "INSERT INTO chunks (course_title, lesson_number, chunk_index, content)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    chunk.course_title,
                    chunk.lesson_number,
                    chunk.chunk_index as i64,
                    chunk.content
                ],
            )?;
            // chunks_fts rows share rowids with chunks so search can join back
            let rowid = tx.last_insert_rowid();
            tx.execute(
                "INSERT INTO chunks_fts (rowid, content) VALUES (?1, ?2)",
                rusqlite::params![rowid, chunk.content],
            )?;
        }
        tx.commit()
    }

    /// BM25-ranked content search with optional course title and lesson filters.
    /// The course title must already be resolved to an exact catalog title.
    pub fn search_chunks(
        &self,
        query: &str,
        course_title: Option<&str>,
        lesson_number: Option<i64>,
        limit: usize,
    ) -> SqliteResult<Vec<SearchHit>> {
        let match_expr = match fts_match_expr(query) {
            Some(expr) => expr,
            None => return Ok(Vec::new()),
        };

        let mut sql = String::from(
            "SELECT c.content, c.course_title, c.lesson_number, bm25(chunks_fts) AS score
             FROM chunks_fts
             JOIN chunks c ON c.id = chunks_fts.rowid
             WHERE chunks_fts MATCH ?1",
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(match_expr)];

        if let Some(title) = course_title {
            params.push(Box::new(title.to_string()));
            sql.push_str(&format!(" AND c.course_title = ?{}", params.len()));
        }
        if let Some(lesson) = lesson_number {
            params.push(Box::new(lesson));
            sql.push_str(&format!(" AND c.lesson_number = ?{}", params.len()));
        }
        params.push(Box::new(limit as i64));
        sql.push_str(&format!(" ORDER BY bm25(chunks_fts) LIMIT ?{}", params.len()));

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let hits = stmt
            .query_map(param_refs.as_slice(), |row| {
                Ok(SearchHit {
                    content: row.get(0)?,
                    course_title: row.get(1)?,
                    lesson_number: row.get(2)?,
                    score: row.get(3)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(hits)
    }

    pub fn get_chunk_count(&self) -> SqliteResult<i64> {
        let conn = self.conn();
        conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
    }
}

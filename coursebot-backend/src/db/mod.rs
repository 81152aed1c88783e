pub mod tables;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Result as SqliteResult;

pub type DbConn = r2d2::PooledConnection<SqliteConnectionManager>;

/// SQLite-backed course catalog and content index.
///
/// FTS5 shadow tables provide BM25 full-text search over course titles
/// (fuzzy course-name resolution) and chunk content (retrieval).
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    pub fn new(database_url: &str) -> Result<Self, String> {
        let (manager, pool_size) = if database_url == ":memory:" {
            // An in-memory database is private to its connection, so the
            // pool must never grow beyond one.
            (SqliteConnectionManager::memory(), 1)
        } else {
            if let Some(parent) = std::path::Path::new(database_url).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| format!("Failed to create database directory: {}", e))?;
                }
            }
            (SqliteConnectionManager::file(database_url), 8)
        };

        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e| format!("Failed to create connection pool: {}", e))?;

        let db = Database { pool };
        db.init_schema()
            .map_err(|e| format!("Failed to initialize schema: {}", e))?;
        Ok(db)
    }

    pub(crate) fn conn(&self) -> DbConn {
        self.pool
            .get()
            .expect("Failed to get database connection from pool")
    }

    fn init_schema(&self) -> SqliteResult<()> {
        let conn = self.conn();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS courses (
                title TEXT PRIMARY KEY,
                instructor TEXT,
                course_link TEXT,
                lessons_json TEXT NOT NULL DEFAULT '[]',
                lesson_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE VIRTUAL TABLE IF NOT EXISTS courses_fts USING fts5(title);

            CREATE TABLE IF NOT EXISTS chunks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_title TEXT NOT NULL,
                lesson_number INTEGER,
                chunk_index INTEGER NOT NULL,
                content TEXT NOT NULL
            );

            CREATE VIRTUAL TABLE IF NOT EXISTS chunks_fts USING fts5(content);",
        )
    }
}

/// Build an FTS5 MATCH expression from free-form user text.
///
/// Tokens are quoted so punctuation cannot break the MATCH syntax, and
/// joined with OR so any overlapping word can rank. Returns None when the
/// input contains no searchable tokens.
pub(crate) fn fts_match_expr(input: &str) -> Option<String> {
    let tokens: Vec<String> = input
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{}\"", t))
        .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" OR "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fts_match_expr_quotes_tokens() {
        let expr = fts_match_expr("computer use").unwrap();
        assert_eq!(expr, "\"computer\" OR \"use\"");
    }

    #[test]
    fn test_fts_match_expr_strips_punctuation() {
        let expr = fts_match_expr("What's MCP: anyway?").unwrap();
        assert_eq!(expr, "\"What\" OR \"s\" OR \"MCP\" OR \"anyway\"");
    }

    #[test]
    fn test_fts_match_expr_empty_input() {
        assert!(fts_match_expr("").is_none());
        assert!(fts_match_expr("?!").is_none());
    }

    #[test]
    fn test_in_memory_database_schema() {
        let db = Database::new(":memory:").expect("in-memory db");
        assert_eq!(db.get_course_count().unwrap(), 0);
    }
}

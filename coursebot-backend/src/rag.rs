//! Ties the retrieval index, tools, generator, and sessions together.

use crate::ai::{AiClient, GenerateError, GeneratorConfig, ResponseGenerator};
use crate::config::Config;
use crate::db::Database;
use crate::document_processor::DocumentProcessor;
use crate::models::Course;
use crate::sessions::SessionManager;
use crate::tools::{create_default_registry, Source, ToolRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct RagSystem {
    db: Arc<Database>,
    processor: DocumentProcessor,
    registry: Arc<ToolRegistry>,
    generator: ResponseGenerator,
    pub sessions: Arc<SessionManager>,
}

impl RagSystem {
    pub fn new(config: &Config, db: Arc<Database>, client: Arc<dyn AiClient>) -> Self {
        let registry = Arc::new(create_default_registry(
            Arc::clone(&db),
            config.max_results,
        ));
        let generator = ResponseGenerator::new(
            client,
            GeneratorConfig {
                max_tool_rounds: config.max_tool_rounds,
                ..GeneratorConfig::default()
            },
        );

        RagSystem {
            db,
            processor: DocumentProcessor::new(config.chunk_size, config.chunk_overlap),
            registry,
            generator,
            sessions: Arc::new(SessionManager::new(config.max_history)),
        }
    }

    /// Answers one user query within a session, returning the answer text and
    /// the sources the tools touched while producing it.
    pub async fn query(
        &self,
        query_text: &str,
        session_id: &str,
    ) -> Result<(String, Vec<Source>), GenerateError> {
        let prompt = format!(
            "Answer this question about course materials: {}",
            query_text
        );
        let history = self.sessions.get_conversation_history(session_id);
        let schemas = self.registry.get_tool_definitions();

        let answer = self
            .generator
            .generate(
                &prompt,
                history.as_deref(),
                Some(&schemas),
                Some(self.registry.as_ref()),
            )
            .await?;

        let sources = self.registry.get_last_sources();
        self.registry.reset_sources();

        // The session keeps the user's words, not the wrapped prompt
        self.sessions.add_exchange(session_id, query_text, &answer);

        Ok((answer, sources))
    }

    /// Parses and indexes a single course document. Failures are logged and
    /// reported as an empty result so one bad file cannot abort ingestion.
    pub fn add_course_document(&self, file_path: &Path) -> (Option<Course>, usize) {
        match self.processor.process_course_document(file_path) {
            Ok((course, chunks)) => {
                if let Err(e) = self.db.add_course_metadata(&course) {
                    log::error!(
                        "[RAG] Failed to index metadata for {}: {}",
                        file_path.display(),
                        e
                    );
                    return (None, 0);
                }
                if let Err(e) = self.db.add_course_content(&chunks) {
                    log::error!(
                        "[RAG] Failed to index content for {}: {}",
                        file_path.display(),
                        e
                    );
                    return (None, 0);
                }
                let chunk_count = chunks.len();
                (Some(course), chunk_count)
            }
            Err(e) => {
                log::error!("[RAG] Failed to process {}: {}", file_path.display(), e);
                (None, 0)
            }
        }
    }

    /// Indexes every course document in a folder, skipping titles that are
    /// already in the catalog. Returns (courses added, chunks added).
    pub fn add_course_folder(&self, folder_path: &Path, clear_existing: bool) -> (usize, usize) {
        if !folder_path.exists() {
            log::warn!(
                "[RAG] Documents folder {} does not exist",
                folder_path.display()
            );
            return (0, 0);
        }

        if clear_existing {
            log::info!("[RAG] Clearing existing course index");
            if let Err(e) = self.db.clear_all() {
                log::error!("[RAG] Failed to clear course index: {}", e);
                return (0, 0);
            }
        }

        let mut existing = self.db.get_existing_course_titles().unwrap_or_default();

        let mut paths: Vec<PathBuf> = match fs::read_dir(folder_path) {
            Ok(dir) => dir.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(e) => {
                log::error!("[RAG] Failed to read {}: {}", folder_path.display(), e);
                return (0, 0);
            }
        };
        paths.sort();

        let mut courses_added = 0;
        let mut chunks_added = 0;
        for path in paths {
            if !is_course_document(&path) {
                continue;
            }

            match self.processor.process_course_document(&path) {
                Ok((course, chunks)) => {
                    if existing.contains(&course.title) {
                        log::info!("[RAG] Skipping already indexed course: {}", course.title);
                        continue;
                    }
                    if let Err(e) = self.db.add_course_metadata(&course) {
                        log::error!(
                            "[RAG] Failed to index metadata for {}: {}",
                            path.display(),
                            e
                        );
                        continue;
                    }
                    if let Err(e) = self.db.add_course_content(&chunks) {
                        log::error!(
                            "[RAG] Failed to index content for {}: {}",
                            path.display(),
                            e
                        );
                        continue;
                    }
                    log::info!(
                        "[RAG] Indexed course '{}' ({} chunks)",
                        course.title,
                        chunks.len()
                    );
                    existing.insert(course.title);
                    courses_added += 1;
                    chunks_added += chunks.len();
                }
                Err(e) => log::error!("[RAG] Failed to process {}: {}", path.display(), e),
            }
        }

        if let Ok(total) = self.db.get_chunk_count() {
            log::debug!("[RAG] Content index now holds {} chunks", total);
        }

        (courses_added, chunks_added)
    }

    pub fn get_course_analytics(&self) -> Result<(i64, Vec<String>), String> {
        let total_courses = self
            .db
            .get_course_count()
            .map_err(|e| format!("Failed to count courses: {}", e))?;
        let course_titles = self
            .db
            .get_course_titles()
            .map_err(|e| format!("Failed to list courses: {}", e))?;
        Ok((total_courses, course_titles))
    }
}

fn is_course_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "txt" | "pdf" | "docx"))
        .unwrap_or(false)
}

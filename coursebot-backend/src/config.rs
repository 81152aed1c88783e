use std::env;

#[derive(Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub max_results: usize,
    pub max_history: usize,
    pub max_tool_rounds: u32,
    pub database_url: String,
    pub docs_dir: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            anthropic_model: env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string()),
            chunk_size: env::var("CHUNK_SIZE")
                .unwrap_or_else(|_| "800".to_string())
                .parse()
                .expect("CHUNK_SIZE must be a valid number"),
            chunk_overlap: env::var("CHUNK_OVERLAP")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .expect("CHUNK_OVERLAP must be a valid number"),
            max_results: env::var("MAX_RESULTS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("MAX_RESULTS must be a valid number"),
            max_history: env::var("MAX_HISTORY")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .expect("MAX_HISTORY must be a valid number"),
            max_tool_rounds: env::var("MAX_TOOL_ROUNDS")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .expect("MAX_TOOL_ROUNDS must be a valid number"),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "./.db/courses.db".to_string()),
            docs_dir: env::var("DOCS_DIR").unwrap_or_else(|_| "./docs".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .expect("PORT must be a valid number"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anthropic_api_key: String::new(),
            anthropic_model: "claude-sonnet-4-20250514".to_string(),
            chunk_size: 800,
            chunk_overlap: 100,
            max_results: 5,
            max_history: 2,
            max_tool_rounds: 2,
            database_url: "./.db/courses.db".to_string(),
            docs_dir: "./docs".to_string(),
            port: 8000,
        }
    }
}

mod ai;
mod config;
mod controllers;
mod db;
mod document_processor;
mod http;
mod models;
mod rag;
mod sessions;
mod tools;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use std::path::Path;
use std::sync::Arc;

use crate::ai::ClaudeClient;
use crate::config::Config;
use crate::db::Database;
use crate::rag::RagSystem;

pub struct AppState {
    pub rag: Arc<RagSystem>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    let database =
        Arc::new(Database::new(&config.database_url).expect("Failed to initialize database"));
    log::info!("Database initialized at {}", config.database_url);

    let claude = ClaudeClient::new(
        &config.anthropic_api_key,
        None,
        Some(&config.anthropic_model),
    )
    .expect("Failed to initialize Claude client");
    log::info!("Claude client initialized with model {}", config.anthropic_model);

    let rag = Arc::new(RagSystem::new(
        &config,
        Arc::clone(&database),
        Arc::new(claude),
    ));

    let docs_dir = Path::new(&config.docs_dir);
    if docs_dir.exists() {
        let (courses, chunks) = rag.add_course_folder(docs_dir, false);
        log::info!(
            "[INGEST] Loaded {} new courses ({} chunks) from {}",
            courses,
            chunks,
            config.docs_dir
        );
    } else {
        log::warn!(
            "[INGEST] Documents directory {} not found, serving the existing index",
            config.docs_dir
        );
    }

    log::info!("Starting coursebot backend on port {}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                rag: Arc::clone(&rag),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            .configure(controllers::query::config)
            .configure(controllers::courses::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

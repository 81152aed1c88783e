use crate::controllers::ErrorResponse;
use crate::AppState;
use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CourseStats {
    pub total_courses: i64,
    pub course_titles: Vec<String>,
}

async fn get_courses(state: web::Data<AppState>) -> impl Responder {
    match state.rag.get_course_analytics() {
        Ok((total_courses, course_titles)) => HttpResponse::Ok().json(CourseStats {
            total_courses,
            course_titles,
        }),
        Err(e) => {
            log::error!("[API] Course analytics failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse { error: e })
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/courses").route(web::get().to(get_courses)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::MockAiClient;
    use crate::ai::AiClient;
    use crate::config::Config;
    use crate::db::Database;
    use crate::models::Course;
    use crate::rag::RagSystem;
    use actix_web::{test, App};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_course_analytics_endpoint() {
        let db = Arc::new(Database::new(":memory:").expect("in-memory db"));
        db.add_course_metadata(&Course {
            title: "Prompt Compression and Query Optimization".to_string(),
            course_link: None,
            instructor: None,
            lessons: Vec::new(),
        })
        .expect("metadata");

        let client: Arc<dyn AiClient> = Arc::new(MockAiClient::new(Vec::new()));
        let state = web::Data::new(AppState {
            rag: Arc::new(RagSystem::new(&Config::default(), db, client)),
        });
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let req = test::TestRequest::get().uri("/api/courses").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["total_courses"], 1);
        assert_eq!(
            body["course_titles"][0],
            "Prompt Compression and Query Optimization"
        );
    }
}

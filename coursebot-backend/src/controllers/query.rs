use crate::controllers::ErrorResponse;
use crate::tools::Source;
use crate::AppState;
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<Source>,
    pub session_id: String,
}

async fn handle_query(
    state: web::Data<AppState>,
    payload: web::Json<QueryRequest>,
) -> impl Responder {
    let request = payload.into_inner();
    let session_id = match request.session_id {
        Some(id) => id,
        None => state.rag.sessions.create_session(),
    };

    match state.rag.query(&request.query, &session_id).await {
        Ok((answer, sources)) => HttpResponse::Ok().json(QueryResponse {
            answer,
            sources,
            session_id,
        }),
        Err(e) => {
            log::error!("[API] Query failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: e.to_string(),
            })
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/query").route(web::post().to(handle_query)));
}

//! HTTP endpoint handlers

pub mod courses;
pub mod health;
pub mod query;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

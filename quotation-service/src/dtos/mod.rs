//! Request/response DTOs for quotation-service.

pub mod auth;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

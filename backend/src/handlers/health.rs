use actix_web::{HttpResponse, Result};
use serde_json::json;

/// Health check endpoint for container healthchecks
pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({"status": "healthy"})))
}

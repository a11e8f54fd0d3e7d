use actix_web::{HttpResponse, Responder};

use crate::models::HealthResponse;

/// Liveness probe for the hosting platform
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        message: format!("ramsgate {} is running", crate::VERSION),
    })
}

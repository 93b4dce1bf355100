use actix_web::{get, web};

use crate::dto::HealthResponse;

/// Liveness check.
#[get("/health")]
pub async fn health() -> web::Json<HealthResponse> {
    web::Json(HealthResponse { status: "ok" })
}

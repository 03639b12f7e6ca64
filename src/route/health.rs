use chrono::{DateTime, Utc};
use rocket::serde::json::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Liveness probe, the only unauthenticated endpoint besides login and register.
#[utoipa::path(
    responses(
        (status = 200, description = "Service is running", body = HealthResponse),
    )
)]
#[get("/health")]
pub fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Tuition Center API is running!".to_string(),
        timestamp: Utc::now(),
    })
}

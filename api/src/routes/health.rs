use actix_web::{web, HttpResponse};
use chrono::Utc;
use vt_core::VerificationStore;

use crate::dto::HealthResponse;
use crate::routes::verification::AppState;

/// Health check endpoint handler
///
/// Answers 503 while the store is unreachable.
pub async fn health_check<S: VerificationStore + 'static>(state: web::Data<AppState<S>>) -> HttpResponse {
    match state.engine.health_check().await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse {
            status: "healthy".to_string(),
            store: "up".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
        }),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "unhealthy".to_string(),
                store: "down".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                timestamp: Utc::now(),
            })
        }
    }
}

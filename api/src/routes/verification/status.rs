use actix_web::{web, HttpResponse};
use uuid::Uuid;
use vt_core::VerificationStore;

use super::AppState;
use crate::handlers::ApiError;

/// Handler for GET /api/v1/verifications/{request_id}
///
/// Ids that do not parse as UUIDs are reported as not found.
pub async fn status<S: VerificationStore + 'static>(
    state: web::Data<AppState<S>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::parse_str(&path.into_inner())
        .map_err(|_| ApiError::Verification(vt_core::VerificationError::NotFound))?;

    let status = state.engine.status(request_id).await?;

    Ok(HttpResponse::Ok().json(status))
}

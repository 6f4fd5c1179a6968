use actix_web::{web, HttpResponse};
use vt_core::VerificationStore;

use super::AppState;
use crate::dto::{RevokeVerificationRequest, RevokeVerificationResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/v1/verifications/revoke
pub async fn revoke<S: VerificationStore + 'static>(
    state: web::Data<AppState<S>>,
    body: web::Json<RevokeVerificationRequest>,
) -> Result<HttpResponse, ApiError> {
    let outcome = state.engine.revoke(body.request_id).await?;

    Ok(HttpResponse::Ok().json(RevokeVerificationResponse::from(outcome)))
}

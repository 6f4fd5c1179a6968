use actix_web::{web, HttpResponse};
use validator::Validate;
use vt_core::VerificationStore;

use super::AppState;
use crate::dto::{ConfirmVerificationRequest, ConfirmVerificationResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/v1/verifications/confirm
///
/// Returns the confirmed subject and purpose. Callers must check the purpose
/// matches the action they are about to authorize.
pub async fn confirm<S: VerificationStore + 'static>(
    state: web::Data<AppState<S>>,
    body: web::Json<ConfirmVerificationRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    body.validate()?;

    let outcome = state.engine.confirm(&body.token).await?;

    Ok(HttpResponse::Ok().json(ConfirmVerificationResponse::from(outcome)))
}

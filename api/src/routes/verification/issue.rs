use actix_web::{web, HttpResponse};
use validator::Validate;
use vt_core::VerificationStore;
use vt_shared::mask_destination;

use super::AppState;
use crate::dto::{IssueVerificationRequest, IssueVerificationResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/v1/verifications/issue
///
/// # Request Body
///
/// ```json
/// {
///     "subject_id": "alice@example.com",
///     "purpose": "email_confirm",
///     "ttl_seconds": 900
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{ "request_id": "...", "expires_at": "..." }`. The
/// token itself only travels through the notifier.
pub async fn issue<S: VerificationStore + 'static>(
    state: web::Data<AppState<S>>,
    body: web::Json<IssueVerificationRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    body.validate()?;

    tracing::info!(
        subject = %mask_destination(&body.subject_id),
        purpose = %body.purpose,
        "Processing issue request"
    );

    let outcome = state
        .engine
        .issue(body.into_issue_request(), state.notifier.as_ref())
        .await?;

    Ok(HttpResponse::Created().json(IssueVerificationResponse::from(outcome)))
}

/// Handler for POST /api/v1/verifications/reissue
///
/// Same body and response as `issue`; pending requests for the subject and
/// purpose are revoked first.
pub async fn reissue<S: VerificationStore + 'static>(
    state: web::Data<AppState<S>>,
    body: web::Json<IssueVerificationRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    body.validate()?;

    tracing::info!(
        subject = %mask_destination(&body.subject_id),
        purpose = %body.purpose,
        "Processing reissue request"
    );

    let outcome = state
        .engine
        .reissue(body.into_issue_request(), state.notifier.as_ref())
        .await?;

    Ok(HttpResponse::Created().json(IssueVerificationResponse::from(outcome)))
}

//! Mapping of engine errors onto HTTP responses
//!
//! Every failure leaves the API as the shared `ErrorResponse` body, so
//! clients can switch on the `error` code regardless of the endpoint.

use actix_web::{
    error::{JsonPayloadError, ResponseError},
    http::{header, StatusCode},
    HttpRequest, HttpResponse,
};
use std::fmt;
use validator::ValidationErrors;
use vt_core::VerificationError;
use vt_shared::{error_codes, ErrorResponse};

/// Error returned by the verification handlers
#[derive(Debug)]
pub enum ApiError {
    /// The engine rejected the operation
    Verification(VerificationError),
    /// The request body failed validation
    Validation(ValidationErrors),
    /// The request body could not be parsed
    BadRequest(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Verification(e) => write!(f, "{}", e),
            ApiError::Validation(e) => write!(f, "Validation failed: {}", e),
            ApiError::BadRequest(message) => write!(f, "{}", message),
        }
    }
}

impl From<VerificationError> for ApiError {
    fn from(error: VerificationError) -> Self {
        ApiError::Verification(error)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl ApiError {
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            ApiError::Verification(e) => verification_error_response(e),
            ApiError::Validation(errors) => {
                let mut response = ErrorResponse::new(error_codes::VALIDATION_ERROR, "Request validation failed");
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|error| {
                            error
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| error.code.to_string())
                        })
                        .collect();
                    response = response.add_detail(field.to_string(), messages);
                }
                response
            }
            ApiError::BadRequest(message) => ErrorResponse::new(error_codes::VALIDATION_ERROR, message.clone()),
        }
    }
}

fn verification_error_response(error: &VerificationError) -> ErrorResponse {
    let response = ErrorResponse::new(error.error_code(), public_message(error));

    match error {
        VerificationError::AlreadyFinalized {
            state,
            subject_id,
            purpose,
        } => response
            .add_detail("state", state)
            .add_detail("subject_id", subject_id)
            .add_detail("purpose", purpose),
        VerificationError::SecretMismatch { remaining_attempts } => {
            response.add_detail("remaining_attempts", remaining_attempts)
        }
        VerificationError::DeliveryFailed { request_id, .. } => response.add_detail("request_id", request_id),
        VerificationError::RateLimited { retry_after_seconds } => {
            response.add_detail("retry_after_seconds", retry_after_seconds)
        }
        _ => response,
    }
}

/// Message shown to clients; infrastructure details stay in the logs
fn public_message(error: &VerificationError) -> String {
    match error {
        VerificationError::DeliveryFailed { .. } => "Failed to deliver the verification token".to_string(),
        VerificationError::Unavailable { .. } => "Verification service temporarily unavailable".to_string(),
        VerificationError::Internal { .. } => "An internal error occurred".to_string(),
        other => other.to_string(),
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Verification(e) => match e {
                VerificationError::InvalidRequest { .. }
                | VerificationError::MalformedToken
                | VerificationError::InvalidSignature => StatusCode::BAD_REQUEST,
                VerificationError::SecretMismatch { .. } => StatusCode::UNAUTHORIZED,
                VerificationError::NotFound => StatusCode::NOT_FOUND,
                VerificationError::AlreadyFinalized { .. } => StatusCode::CONFLICT,
                VerificationError::TokenExpired => StatusCode::GONE,
                VerificationError::RateLimited { .. } | VerificationError::TooManyAttempts => {
                    StatusCode::TOO_MANY_REQUESTS
                }
                VerificationError::DeliveryFailed { .. } => StatusCode::BAD_GATEWAY,
                VerificationError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                VerificationError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Verification request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Verification request rejected");
        }

        let mut builder = HttpResponse::build(status);
        if let ApiError::Verification(VerificationError::RateLimited { retry_after_seconds }) = self {
            builder.insert_header((header::RETRY_AFTER, retry_after_seconds.to_string()));
        }
        builder.json(self.to_error_response())
    }
}

/// Turns JSON extractor failures into a `VALIDATION_ERROR` body
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "Request body is too large".to_string()
        }
        other => format!("Invalid JSON body: {}", other),
    };
    ApiError::BadRequest(message).into()
}

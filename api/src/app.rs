//! Application factory
//!
//! Builds the actix-web application around a shared [`AppState`]. The same
//! factory is used by the server binary and by the route tests.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, HttpResponse,
};
use tracing_actix_web::TracingLogger;
use vt_core::VerificationStore;
use vt_shared::{error_codes, Environment, ErrorResponse, ServerConfig};

use crate::handlers::json_error_handler;
use crate::middleware::{create_cors, SecurityHeaders};
use crate::routes::{health::health_check, verification, verification::AppState};

/// Create and configure the application
///
/// # Arguments
///
/// * `app_state` - Engine and notifier shared across workers
/// * `environment` - Selects the CORS policy and header set
/// * `server` - Payload limit and allowed origins
pub fn create_app<S>(
    app_state: web::Data<AppState<S>>,
    environment: Environment,
    server: &ServerConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    S: VerificationStore + 'static,
{
    let json_config = web::JsonConfig::default()
        .limit(server.max_payload_size)
        .error_handler(json_error_handler);

    App::new()
        .app_data(app_state)
        .app_data(json_config)
        // Outermost last: tracing sees the final status, including CORS rejections
        .wrap(SecurityHeaders::new(environment))
        .wrap(create_cors(environment, server))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check::<S>))
        .service(
            web::scope("/api/v1")
                .service(web::scope("/verifications").configure(verification::configure::<S>))
                .route("", web::get().to(api_documentation)),
        )
        .default_service(web::route().to(not_found))
}

/// API index listing the verification endpoints
async fn api_documentation() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "verification-token-service",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /health",
            "issue": "POST /api/v1/verifications/issue",
            "reissue": "POST /api/v1/verifications/reissue",
            "confirm": "POST /api/v1/verifications/confirm",
            "revoke": "POST /api/v1/verifications/revoke",
            "status": "GET /api/v1/verifications/{request_id}",
        }
    }))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}

//! CORS configuration
//!
//! Development allows any origin. Production only allows the origins listed
//! in `ALLOWED_ORIGINS`; with none configured, cross-origin calls are refused.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use vt_shared::{Environment, ServerConfig};

/// Preflight cache lifetime in seconds
const CORS_MAX_AGE: usize = 3600;

/// Creates a CORS middleware instance for the environment
pub fn create_cors(environment: Environment, server: &ServerConfig) -> Cors {
    if environment.is_production() {
        create_production_cors(&server.allowed_origins)
    } else {
        create_development_cors()
    }
}

fn create_development_cors() -> Cors {
    tracing::info!("Configuring CORS for development environment");

    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::USER_AGENT,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers(vec![header::RETRY_AFTER, header::HeaderName::from_static("x-request-id")])
        .max_age(CORS_MAX_AGE)
}

fn create_production_cors(allowed_origins: &[String]) -> Cors {
    tracing::info!(origins = allowed_origins.len(), "Configuring CORS for production environment");

    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .expose_headers(vec![header::RETRY_AFTER, header::HeaderName::from_static("x-request-id")])
        .max_age(CORS_MAX_AGE);

    for origin in allowed_origins {
        tracing::info!(origin = %origin, "Adding allowed origin");
        cors = cors.allowed_origin(origin);
    }

    cors
}

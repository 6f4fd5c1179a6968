//! HTTP binding for the verification-token lifecycle service
//!
//! Exposes issue, reissue, confirm, revoke and status over actix-web, plus a
//! health endpoint reporting store availability.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::create_app;
pub use routes::verification::AppState;

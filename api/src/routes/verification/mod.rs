//! Verification lifecycle endpoints
//!
//! - `POST /issue` and `POST /reissue` create a request and deliver its token
//! - `POST /confirm` redeems a token
//! - `POST /revoke` cancels a pending request
//! - `GET /{request_id}` returns the request status

pub mod confirm;
pub mod issue;
pub mod revoke;
pub mod status;

use actix_web::web;
use std::sync::Arc;
use vt_core::{VerificationEngine, VerificationNotifier, VerificationStore};

/// Application state shared by the verification handlers
pub struct AppState<S: VerificationStore + 'static> {
    pub engine: Arc<VerificationEngine<S>>,
    pub notifier: Arc<dyn VerificationNotifier>,
}

impl<S: VerificationStore + 'static> AppState<S> {
    pub fn new(engine: Arc<VerificationEngine<S>>, notifier: Arc<dyn VerificationNotifier>) -> Self {
        Self { engine, notifier }
    }
}

/// Register the verification routes on a scope
pub fn configure<S: VerificationStore + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/issue", web::post().to(issue::issue::<S>))
        .route("/reissue", web::post().to(issue::reissue::<S>))
        .route("/confirm", web::post().to(confirm::confirm::<S>))
        .route("/revoke", web::post().to(revoke::revoke::<S>))
        .route("/{request_id}", web::get().to(status::status::<S>));
}

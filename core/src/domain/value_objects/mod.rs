//! Value objects used by the verification lifecycle.

pub mod request_status;
pub mod secret;

pub use request_status::RequestStatus;
pub use secret::{VerificationSecret, SECRET_LENGTH};

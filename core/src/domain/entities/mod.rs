//! Domain entities representing core business objects.

pub mod verification_request;


// Re-export commonly used types
pub use verification_request::{Purpose, VerificationRequest, VerificationState, MAX_SUBJECT_ID_LENGTH};

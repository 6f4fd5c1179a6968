//! # Verification Core
//!
//! Core business logic for the verification-token lifecycle service.
//! This crate contains the verification request entity, the token codec,
//! the store contract with an in-memory implementation, the verification
//! engine and the expiry sweeper. Persistence and delivery are abstract
//! interfaces implemented in `vt_infra`.

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;

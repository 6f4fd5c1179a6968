//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

// Re-export all error types
pub use types::{StoreError, TokenError, VerificationError};

/// Result type returned by the verification engine
pub type VerificationResult<T> = Result<T, VerificationError>;

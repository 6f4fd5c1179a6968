//! Business services containing the verification lifecycle.

pub mod codec;
pub mod sweep;
pub mod verification;

// Re-export commonly used types
pub use codec::{DecodedToken, SigningKeys, TokenClaims, TokenCodec};
pub use sweep::{ExpirySweepConfig, ExpirySweeper, SweepResult};
pub use verification::{
    ConfirmOutcome, Delivery, InMemoryIssueRateLimiter, IssueOutcome, IssueRateLimiter, IssueRequest,
    RateDecision, RevokeOutcome, VerificationEngine, VerificationNotifier, VerificationServiceConfig,
};

//! Random verification secret embedded in tokens.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Number of random bytes in a secret
pub const SECRET_LENGTH: usize = 32;

/// Raw secret handed to the subject inside the token
///
/// Never persisted and never logged. Only [`VerificationSecret::hash`] is stored.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationSecret([u8; SECRET_LENGTH]);

impl VerificationSecret {
    /// Generates a secret from the operating system CSPRNG
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SECRET_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Hex encoded SHA-256 of the secret
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0);
        hex::encode(hasher.finalize())
    }

    /// Constant-time comparison against a stored hash
    pub fn matches_hash(&self, stored_hash: &str) -> bool {
        constant_time_eq(self.hash().as_bytes(), stored_hash.as_bytes())
    }

    /// URL-safe base64 form used in token claims
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    /// Parses the claim form back; `None` when the value is not exactly one secret
    pub fn decode(encoded: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        let bytes: [u8; SECRET_LENGTH] = bytes.try_into().ok()?;
        Some(Self(bytes))
    }
}

impl std::fmt::Debug for VerificationSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VerificationSecret(<redacted>)")
    }
}

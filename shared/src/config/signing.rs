//! Token signing key configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key material used only when nothing else is configured
pub const DEVELOPMENT_SIGNING_KEY: &str = "development-signing-key-change-me-in-production!";

/// Minimum length of any signing key, in bytes
pub const MIN_SIGNING_KEY_LENGTH: usize = 32;

/// Signing key ring configuration
///
/// The active key signs every new token and its id travels in the token
/// header. Retired keys are still accepted when decoding, so tokens issued
/// before a key change stay confirmable until they expire.
#[derive(Clone, Deserialize, Serialize)]
pub struct SigningConfig {
    /// Identifier of the active key
    pub active_key_id: String,

    /// Active key material
    pub active_key: String,

    /// Retired keys by id, accepted for decoding only
    #[serde(default)]
    pub retired_keys: BTreeMap<String, String>,

    /// Token issuer claim
    pub issuer: String,

    /// Token audience claim
    pub audience: String,
}

impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningConfig")
            .field("active_key_id", &self.active_key_id)
            .field("retired_key_ids", &self.retired_keys.keys().collect::<Vec<_>>())
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            active_key_id: String::from("dev"),
            active_key: String::from(DEVELOPMENT_SIGNING_KEY),
            retired_keys: BTreeMap::new(),
            issuer: String::from("verification-service"),
            audience: String::from("verification"),
        }
    }
}

impl SigningConfig {
    /// Create a configuration with a single active key
    pub fn new(key_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            active_key_id: key_id.into(),
            active_key: key.into(),
            ..Default::default()
        }
    }

    /// Accept tokens signed by a retired key
    pub fn with_retired_key(mut self, key_id: impl Into<String>, key: impl Into<String>) -> Self {
        self.retired_keys.insert(key_id.into(), key.into());
        self
    }

    /// Create from environment variables
    ///
    /// `VERIFICATION_RETIRED_KEYS` holds `id:key` pairs separated by commas.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let retired_keys = std::env::var("VERIFICATION_RETIRED_KEYS")
            .map(|raw| parse_key_pairs(&raw))
            .unwrap_or_default();

        Self {
            active_key_id: std::env::var("VERIFICATION_SIGNING_KEY_ID").unwrap_or(defaults.active_key_id),
            active_key: std::env::var("VERIFICATION_SIGNING_KEY").unwrap_or(defaults.active_key),
            retired_keys,
            issuer: std::env::var("VERIFICATION_TOKEN_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("VERIFICATION_TOKEN_AUDIENCE").unwrap_or(defaults.audience),
        }
    }

    /// Check if using the built-in development key (security warning)
    pub fn is_using_default_key(&self) -> bool {
        self.active_key == DEVELOPMENT_SIGNING_KEY
    }
}

fn parse_key_pairs(raw: &str) -> BTreeMap<String, String> {
    raw.split(',')
        .filter_map(|pair| {
            let (id, key) = pair.trim().split_once(':')?;
            if id.is_empty() || key.is_empty() {
                return None;
            }
            Some((id.to_string(), key.to_string()))
        })
        .collect()
}

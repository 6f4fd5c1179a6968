//! Signing key ring for verification tokens

use jsonwebtoken::{DecodingKey, EncodingKey};
use std::collections::HashMap;
use vt_shared::config::{SigningConfig, MIN_SIGNING_KEY_LENGTH};

use crate::errors::TokenError;

/// One active signing key plus retired keys accepted for decoding
#[derive(Clone)]
pub struct SigningKeys {
    active_id: String,
    encoding_key: EncodingKey,
    decoding_keys: HashMap<String, DecodingKey>,
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut key_ids: Vec<&String> = self.decoding_keys.keys().collect();
        key_ids.sort();
        f.debug_struct("SigningKeys")
            .field("active_id", &self.active_id)
            .field("key_ids", &key_ids)
            .finish()
    }
}

impl SigningKeys {
    /// Creates a key ring with a single active key
    ///
    /// # Arguments
    ///
    /// * `key_id` - Identifier written to the token header
    /// * `secret` - Key material, at least 32 bytes
    ///
    /// # Returns
    ///
    /// * `Ok(SigningKeys)` - Key ring ready for encoding and decoding
    /// * `Err(TokenError::KeyConfiguration)` - Empty id or short key
    pub fn new(key_id: impl Into<String>, secret: &[u8]) -> Result<Self, TokenError> {
        let key_id = key_id.into();
        check_key(&key_id, secret)?;

        let mut decoding_keys = HashMap::new();
        decoding_keys.insert(key_id.clone(), DecodingKey::from_secret(secret));

        Ok(Self {
            active_id: key_id,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_keys,
        })
    }

    /// Accept tokens signed with a key that is no longer active
    pub fn with_retired_key(mut self, key_id: impl Into<String>, secret: &[u8]) -> Result<Self, TokenError> {
        let key_id = key_id.into();
        check_key(&key_id, secret)?;

        if key_id == self.active_id {
            return Err(TokenError::KeyConfiguration {
                message: format!("retired key id '{}' equals the active key id", key_id),
            });
        }
        self.decoding_keys.insert(key_id, DecodingKey::from_secret(secret));
        Ok(self)
    }

    /// Builds the key ring from configuration
    pub fn from_config(config: &SigningConfig) -> Result<Self, TokenError> {
        config
            .retired_keys
            .iter()
            .try_fold(
                Self::new(config.active_key_id.clone(), config.active_key.as_bytes())?,
                |keys, (key_id, secret)| keys.with_retired_key(key_id.clone(), secret.as_bytes()),
            )
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self, key_id: &str) -> Option<&DecodingKey> {
        self.decoding_keys.get(key_id)
    }
}

fn check_key(key_id: &str, secret: &[u8]) -> Result<(), TokenError> {
    if key_id.is_empty() {
        return Err(TokenError::KeyConfiguration {
            message: "key id must not be empty".to_string(),
        });
    }
    if secret.len() < MIN_SIGNING_KEY_LENGTH {
        return Err(TokenError::KeyConfiguration {
            message: format!(
                "key '{}' must be at least {} bytes",
                key_id, MIN_SIGNING_KEY_LENGTH
            ),
        });
    }
    Ok(())
}

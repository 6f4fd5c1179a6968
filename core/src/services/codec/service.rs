//! Token codec implementation

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vt_shared::config::SigningConfig;

use crate::domain::entities::Purpose;
use crate::domain::value_objects::VerificationSecret;
use crate::errors::TokenError;

use super::keys::SigningKeys;

/// Claims carried by a verification token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Verification request id
    pub jti: Uuid,
    /// Raw secret, URL-safe base64
    pub sec: String,
    /// Purpose the token was issued for
    pub pur: Purpose,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// Fields recovered from a verification token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub request_id: Uuid,
    pub secret: VerificationSecret,
    pub purpose: Purpose,
    pub expires_at: DateTime<Utc>,
    /// Key that signed the token
    pub key_id: String,
}

/// Encodes and decodes verification tokens
///
/// A pure function pair over a fixed key ring. Expiry is not checked here;
/// the engine compares against the stored record with its own clock.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    keys: SigningKeys,
    issuer: String,
    audience: String,
    validation: Validation,
}

impl TokenCodec {
    /// Creates a codec
    ///
    /// # Arguments
    ///
    /// * `keys` - Signing key ring
    /// * `issuer` - Value of the `iss` claim
    /// * `audience` - Value of the `aud` claim
    pub fn new(keys: SigningKeys, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        let issuer = issuer.into();
        let audience = audience.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_audience(&[audience.as_str()]);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Self {
            keys,
            issuer,
            audience,
            validation,
        }
    }

    /// Creates a codec from the signing configuration
    pub fn from_config(config: &SigningConfig) -> Result<Self, TokenError> {
        let keys = SigningKeys::from_config(config)?;
        Ok(Self::new(keys, config.issuer.clone(), config.audience.clone()))
    }

    /// Encodes a token for a request
    ///
    /// # Arguments
    ///
    /// * `id` - Request id
    /// * `secret` - Raw secret (never the hash)
    /// * `purpose` - Verification purpose
    /// * `expires_at` - Expiry time of the request
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The opaque token
    /// * `Err(TokenError::EncodingFailed)` - Signing failed
    pub fn encode(
        &self,
        id: Uuid,
        secret: &VerificationSecret,
        purpose: Purpose,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims {
            jti: id,
            sec: secret.encode(),
            pur: purpose,
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(self.keys.active_id().to_string());

        encode(&header, &claims, self.keys.encoding_key()).map_err(|e| TokenError::EncodingFailed {
            message: e.to_string(),
        })
    }

    /// Decodes and authenticates a token
    ///
    /// # Returns
    ///
    /// * `Ok(DecodedToken)` - Signature valid and claims well formed
    /// * `Err(TokenError::MalformedToken)` - Structure, header or claims are unusable
    /// * `Err(TokenError::InvalidSignature)` - Signature mismatch, unknown key id or wrong algorithm
    pub fn decode(&self, token: &str) -> Result<DecodedToken, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::MalformedToken)?;

        if header.alg != Algorithm::HS256 {
            return Err(TokenError::InvalidSignature);
        }
        let key_id = header.kid.ok_or(TokenError::MalformedToken)?;
        let key = self
            .keys
            .decoding_key(&key_id)
            .ok_or(TokenError::InvalidSignature)?;

        let claims = decode::<TokenClaims>(token, key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName => TokenError::InvalidSignature,
                _ => TokenError::MalformedToken,
            })?
            .claims;

        let secret = VerificationSecret::decode(&claims.sec).ok_or(TokenError::MalformedToken)?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(TokenError::MalformedToken)?;

        Ok(DecodedToken {
            request_id: claims.jti,
            secret,
            purpose: claims.pur,
            expires_at,
            key_id,
        })
    }
}

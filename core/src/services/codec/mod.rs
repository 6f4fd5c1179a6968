//! Token codec module
//!
//! Verification tokens are compact HS256 JWS strings. The header names the
//! signing key (`kid`) so retired keys keep decoding after a key change; the
//! claims carry the request id, the raw secret, the purpose and the expiry.

mod keys;
mod service;


pub use keys::SigningKeys;
pub use service::{DecodedToken, TokenClaims, TokenCodec};

//! Signed, time-limited activation tokens.
//!
//! A token carries the user id under `confirm` and an `exp` timestamp, signed
//! with HS256. Expiry is checked without leeway so a link is dead the second
//! its lifetime runs out.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default lifetime of an activation link, in seconds.
pub const DEFAULT_ACTIVATION_TTL_SECS: i64 = 3600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
    #[error("token encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct ActivationClaims {
    confirm: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn with_default_ttl(secret: &str) -> Self {
        Self::new(secret, Duration::seconds(DEFAULT_ACTIVATION_TTL_SECS))
    }

    pub fn encode(&self, user_id: i64) -> Result<String, TokenError> {
        let claims = ActivationClaims { confirm: user_id, exp: (Utc::now() + self.ttl).timestamp() };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Recover the user id from a token.
    pub fn decode(&self, token: &str) -> Result<i64, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        match decode::<ActivationClaims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims.confirm),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(TokenError::Expired),
            Err(_) => Err(TokenError::Invalid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_user_id() {
        let codec = TokenCodec::with_default_ttl("secret");
        let token = codec.encode(42).unwrap();
        assert_eq!(codec.decode(&token), Ok(42));
    }

    #[test]
    fn expired_token_is_distinguished() {
        let codec = TokenCodec::new("secret", Duration::seconds(-120));
        let token = codec.encode(7).unwrap();
        assert_eq!(codec.decode(&token), Err(TokenError::Expired));
    }

    #[test]
    fn foreign_signature_and_garbage_are_invalid() {
        let token = TokenCodec::with_default_ttl("other").encode(7).unwrap();
        let codec = TokenCodec::with_default_ttl("secret");
        assert_eq!(codec.decode(&token), Err(TokenError::Invalid));
        assert_eq!(codec.decode("not-a-token"), Err(TokenError::Invalid));
    }
}

//! Short-lived HS256 bearer tokens bound to a user id.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::clock::Clock;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Claims carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Expiration timestamp (Unix)
    pub exp: i64,
    /// Issued at timestamp (Unix)
    pub iat: i64,
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Issuer with a symmetric secret. Expiry is checked against `clock`
    /// with no leeway.
    pub fn with_hs256(secret: &[u8], ttl_seconds: u64, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds: i64::try_from(ttl_seconds).unwrap_or(i64::MAX),
            clock,
        }
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    pub fn issue(&self, user_id: i32) -> Result<String, TokenError> {
        let iat = self.clock.now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: iat.saturating_add(self.ttl_seconds),
            iat,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Checks signature and expiry, returning the bound user id.
    pub fn verify(&self, token: &str) -> Result<i32, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        let claims = token_data.claims;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        claims
            .sub
            .parse()
            .map_err(|_| TokenError::Invalid(format!("malformed subject '{}'", claims.sub)))
    }
}

/// Random 256-bit signing secret for deployments without a configured one.
#[must_use]
pub fn generate_secret() -> Vec<u8> {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    bytes.to_vec()
}

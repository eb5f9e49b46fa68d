//! Authentication data models and identity-provider token verification

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::common::config::AppConfig;
use crate::common::generate_raw_id;

/// JWT claims structure. `sub` is the identity provider's user id (external id).
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid identity provider public key: {0}")]
    InvalidKey(jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("no token key configured: set CLERK_JWT_KEY or a real JWT_SECRET")]
    NotConfigured,
}

/// Placeholder shipped in sample `.env` files; never accepted as a signing secret
pub const PLACEHOLDER_SECRET: &str = "replace_with_strong_secret";

/// Verifies session tokens issued by the identity provider.
///
/// RS256 against the provider's PEM public key when one is configured,
/// HS256 against a shared secret otherwise.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn hs256(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn rs256_pem(pem: &str) -> Result<Self, TokenError> {
        let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(TokenError::InvalidKey)?;
        Ok(Self {
            key,
            validation: Validation::new(Algorithm::RS256),
        })
    }

    /// Provider key first, then a shared secret. Without either, startup fails
    /// unless dev mode is on, where tokens are never checked and a random secret
    /// stands in.
    pub fn from_config(config: &AppConfig, dev_mode: bool) -> Result<Self, TokenError> {
        if let Some(pem) = &config.clerk_jwt_key {
            // .env files usually carry the PEM on one line with literal "\n"
            return Self::rs256_pem(&pem.replace("\\n", "\n"));
        }

        match config.jwt_secret.as_deref() {
            Some(secret) if secret != PLACEHOLDER_SECRET => Ok(Self::hs256(secret)),
            _ if dev_mode => Ok(Self::hs256(&generate_raw_id(32))),
            _ => Err(TokenError::NotConfigured),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

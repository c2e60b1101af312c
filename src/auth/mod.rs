use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::database::models::User;
use crate::keys::{self, KeyGenError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user: &User, ttl_secs: u64) -> Self {
        let now = Utc::now();
        let ttl = Duration::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX / 1000));

        Self {
            username: user.username.clone(),
            roles: user.roles(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Unable to load JWT key {path}: {message}")]
    KeyLoad { path: String, message: String },

    #[error(transparent)]
    KeyGen(#[from] KeyGenError),
}

/// Signing and verification keys for access tokens.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    token_ttl_secs: u64,
}

impl JwtKeys {
    /// HS256 with a shared secret.
    pub fn from_secret(secret: &[u8], token_ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            token_ttl_secs,
        }
    }

    /// RS256 from an unencrypted private key and its public key.
    pub fn from_rsa_pem(private_pem: &[u8], public_pem: &[u8], token_ttl_secs: u64) -> Result<Self, JwtError> {
        let encoding = EncodingKey::from_rsa_pem(private_pem).map_err(|e| JwtError::KeyLoad {
            path: "private key".to_string(),
            message: e.to_string(),
        })?;
        let decoding = DecodingKey::from_rsa_pem(public_pem).map_err(|e| JwtError::KeyLoad {
            path: "public key".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            encoding,
            decoding,
            algorithm: Algorithm::RS256,
            token_ttl_secs,
        })
    }

    /// Shared secret when configured, otherwise the key pair on disk
    /// (the private key is unlocked with the configured passphrase).
    pub fn from_config(security: &SecurityConfig) -> Result<Self, JwtError> {
        if let Some(secret) = security.jwt_secret.as_deref() {
            tracing::info!("Signing tokens with HS256 shared secret");
            return Ok(Self::from_secret(secret.as_bytes(), security.jwt_token_ttl_secs));
        }

        let public_pem = std::fs::read(&security.jwt_public_key).map_err(|e| JwtError::KeyLoad {
            path: security.jwt_public_key.display().to_string(),
            message: e.to_string(),
        })?;
        let private_pem = keys::decrypt_private_key(&security.jwt_secret_key, &security.jwt_passphrase)?;

        tracing::info!(
            public_key = %security.jwt_public_key.display(),
            "Signing tokens with RS256 key pair"
        );
        Self::from_rsa_pem(&private_pem, &public_pem, security.jwt_token_ttl_secs)
    }

    pub fn create(&self, user: &User) -> Result<String, JwtError> {
        let claims = Claims::for_user(user, self.token_ttl_secs);
        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Verifies signature and expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::new(self.algorithm);
        let token_data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?;
        Ok(token_data.claims)
    }
}

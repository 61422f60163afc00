//! JWT token service
//!
//! End-user login lives outside this service; tokens are issued elsewhere
//! (HS256, shared secret). [`JwtService::generate_token`] serves tools and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::permissions::ADMIN;

const MIN_SECRET_LEN: usize = 32;
const DEFAULT_ISSUER: &str = "hr-desk";
const DEFAULT_AUDIENCE: &str = "hr-desk-clients";

/// JWT settings
///
/// | Variable | Default |
/// |----------|---------|
/// | JWT_SECRET | none (temporary random key) |
/// | JWT_EXPIRATION_MINUTES | 1440 |
/// | JWT_ISSUER | hr-desk |
/// | JWT_AUDIENCE | hr-desk-clients |
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Shared secret, at least 32 bytes. `None` means a temporary key is
    /// generated at startup and every external token dies with the process.
    pub secret: Option<String>,
    /// Token lifetime in minutes
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("expiration_minutes", &self.expiration_minutes)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(24 * 60),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| DEFAULT_AUDIENCE.into()),
        }
    }
}

impl JwtConfig {
    /// The configured secret, or a fresh temporary one when none is set
    ///
    /// A secret that is set but too short is a startup error.
    fn signing_secret(&self) -> Result<String, JwtError> {
        match &self.secret {
            Some(secret) if secret.len() >= MIN_SECRET_LEN => Ok(secret.clone()),
            Some(_) => Err(JwtError::WeakSecret(MIN_SECRET_LEN)),
            None => {
                tracing::warn!("JWT_SECRET is not set, using a temporary key");
                temporary_secret()
            }
        }
    }
}

/// 64 hex characters from the system RNG
fn temporary_secret() -> Result<String, JwtError> {
    let mut bytes = [0u8; 32];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| JwtError::KeyUnavailable)?;
    Ok(hex::encode(bytes))
}

/// Token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Name written to the audit log
    pub username: String,
    /// admin / hr / it / manager / auditor
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),

    #[error("JWT_SECRET must be at least {0} bytes")]
    WeakSecret(usize),

    #[error("System RNG unavailable, cannot generate a signing key")]
    KeyUnavailable,
}
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Fails when the secret is too short or no temporary key can be made
    pub fn with_config(config: JwtConfig) -> Result<Self, JwtError> {
        let secret = config.signing_secret()?;
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            config,
        })
    }

    pub fn generate_token(&self, user_id: &str, username: &str, role: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            exp: (now + Duration::minutes(self.config.expiration_minutes)).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Checks signature, issuer, audience and expiry
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iss", "aud"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }

    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Authenticated caller, put into request extensions by the auth middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub role: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN
    }

    /// `admin` holds every role
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        self.is_admin() || roles.contains(&self.role.as_str())
    }
}

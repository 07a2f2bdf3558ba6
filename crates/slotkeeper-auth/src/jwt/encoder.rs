//! JWT token creation with configurable signing and TTL.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::info;
use uuid::Uuid;

use slotkeeper_core::config::AuthConfig;
use slotkeeper_core::error::AppError;
use slotkeeper_entity::user::UserRole;

use super::claims::Claims;

/// Creates signed JWT access tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Access token TTL in minutes.
    access_ttl_minutes: i64,
    /// Value of the `iss` claim.
    issuer: String,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// A freshly signed token.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IssuedToken {
    /// The encoded JWT.
    pub access_token: String,
    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl_minutes: config.jwt_access_ttl_minutes as i64,
            issuer: config.issuer.clone(),
        }
    }

    /// Issues an access token with the configured TTL.
    pub fn issue(&self, subject: &str, role: UserRole) -> Result<IssuedToken, AppError> {
        self.issue_with_ttl(subject, role, self.access_ttl_minutes)
    }

    /// Issues an access token valid for `ttl_minutes`.
    pub fn issue_with_ttl(
        &self,
        subject: &str,
        role: UserRole,
        ttl_minutes: i64,
    ) -> Result<IssuedToken, AppError> {
        if subject.trim().is_empty() {
            return Err(AppError::validation("Token subject must not be empty"));
        }
        let now = Utc::now();
        let expires_at = now + chrono::Duration::minutes(ttl_minutes);

        let claims = Claims {
            sub: subject.to_string(),
            role,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        info!(subject = %subject, role = %role, expires_at = %expires_at, "Access token issued");
        Ok(IssuedToken {
            access_token,
            expires_at,
        })
    }
}

//! JWT token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use slotkeeper_core::config::AuthConfig;
use slotkeeper_core::error::AppError;

use super::claims::Claims;

/// Validates JWT access tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;
        validation.set_issuer(&[config.issuer.as_str()]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token string.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::unauthorized("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::unauthorized("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::unauthorized("Invalid token signature")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                        AppError::unauthorized("Token was issued by another service")
                    }
                    _ => AppError::unauthorized(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtEncoder;
    use slotkeeper_core::error::ErrorKind;
    use slotkeeper_entity::user::UserRole;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".into(),
            jwt_access_ttl_minutes: 30,
            issuer: "slotkeeper-test".into(),
        }
    }

    #[test]
    fn test_roundtrip_keeps_role() {
        let encoder = JwtEncoder::new(&config());
        let decoder = JwtDecoder::new(&config());

        let issued = encoder.issue("front-desk", UserRole::Subadmin).unwrap();
        let claims = decoder.decode_access_token(&issued.access_token).unwrap();
        assert_eq!(claims.sub, "front-desk");
        assert_eq!(claims.role, UserRole::Subadmin);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_expired_token_rejected() {
        let encoder = JwtEncoder::new(&config());
        let decoder = JwtDecoder::new(&config());

        let issued = encoder.issue_with_ttl("ops", UserRole::Admin, -10).unwrap();
        let err = decoder.decode_access_token(&issued.access_token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let encoder = JwtEncoder::new(&config());
        let mut other = config();
        other.jwt_secret = "different".into();
        let decoder = JwtDecoder::new(&other);

        let issued = encoder.issue("ops", UserRole::Admin).unwrap();
        assert!(decoder.decode_access_token(&issued.access_token).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let encoder = JwtEncoder::new(&config());
        let mut other = config();
        other.issuer = "someone-else".into();
        let decoder = JwtDecoder::new(&other);

        let issued = encoder.issue("ops", UserRole::Admin).unwrap();
        assert!(decoder.decode_access_token(&issued.access_token).is_err());
    }
}

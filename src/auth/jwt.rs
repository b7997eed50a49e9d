//! JWT verification
//!
//! Verifies HS256 access tokens issued by the identity service. The claims
//! carry the user id and role, but the role on the current user row stays
//! authoritative; the extractor re-resolves the user on every request.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT-related errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token decoding failed: {0}")]
    DecodingFailed(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Claims carried by tokens from the identity service
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// User role at issuance time
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Token type (access or refresh)
    pub token_type: String,
}

/// Verify and decode a bearer token
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        if e.to_string().contains("ExpiredSignature") {
            JwtError::TokenExpired
        } else {
            JwtError::DecodingFailed(e.to_string())
        }
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn make_token(secret: &str, ttl_seconds: i64, token_type: &str) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: "42".to_string(),
            role: "fonctionnaire".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            token_type: token_type.to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_valid_token() {
        let token = make_token("test-secret", 900, "access");
        let claims = verify_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_expired_token() {
        // Past the default validation leeway
        let token = make_token("test-secret", -300, "access");
        let result = verify_token(&token, "test-secret");
        assert!(matches!(result, Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret() {
        let token = make_token("secret1", 900, "access");
        assert!(verify_token(&token, "secret2").is_err());
    }

    #[test]
    fn test_garbage_token() {
        assert!(verify_token("not.a.token", "test-secret").is_err());
    }
}

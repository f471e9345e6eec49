//! Signed session tokens.
//!
//! Tokens are HS256 JWTs with a fixed 30-day expiry. The subject is the
//! user's database id; the role travels as a claim so clients can gate
//! their UI without a round trip, though the server re-checks on every
//! protected request.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use carniceria_core::{Role, UserId};

/// Token lifetime. Fixed; there is no refresh flow.
const TOKEN_LIFETIME_DAYS: i64 = 30;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, stringified.
    pub sub: String,
    /// Role at issue time.
    pub role: Role,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp.
    pub iat: i64,
}

impl Claims {
    /// Parse the subject back into a [`UserId`].
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` if the subject is not an integer.
    pub fn user_id(&self) -> Result<UserId, TokenError> {
        self.sub
            .parse::<i32>()
            .map(UserId::new)
            .map_err(|_| TokenError::Malformed("subject is not a user id".to_owned()))
    }
}

/// Errors from token signing and verification.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    /// Create a token service from the signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
        }
    }

    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::GenerationFailed` if encoding fails.
    pub fn issue(&self, user_id: UserId, role: Role) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.as_i32().to_string(),
            role,
            exp: (now + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::GenerationFailed(e.to_string()))
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired`, `TokenError::InvalidSignature`, or
    /// `TokenError::Malformed` depending on what failed.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);

        let data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            })?;

        Ok(data.claims)
    }

    /// Extract the raw token from an `Authorization` header value.
    #[must_use]
    pub fn extract_bearer(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from(
            "unit-test-signing-secret-with-enough-length",
        ))
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let tokens = service();
        let token = tokens.issue(UserId::new(7), Role::Editor).expect("issue");

        let claims = tokens.verify(&token).expect("verify");
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.role, Role::Editor);
        assert_eq!(claims.user_id().expect("user id"), UserId::new(7));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue(UserId::new(1), Role::Admin).expect("issue");

        let other = TokenService::new(&SecretString::from(
            "a-completely-different-signing-secret-here",
        ));
        assert!(matches!(
            other.verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            service().verify("not.a.token"),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(
            TokenService::extract_bearer("Bearer abc.def.ghi"),
            Some("abc.def.ghi")
        );
        assert_eq!(TokenService::extract_bearer("Basic abc"), None);
    }
}

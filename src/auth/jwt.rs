use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::models::UserId;

/// JWT claims carried by session tokens
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: UserId,
    exp: i64,
}

/// Issues and verifies HS256 session tokens
///
/// The signing secret is injected from configuration at startup.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_mins: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_mins),
        }
    }

    /// Sign a token for `user_id` expiring after the configured TTL
    pub fn issue(&self, user_id: UserId) -> Result<String, AuthError> {
        let claims = Claims {
            user_id,
            exp: (Utc::now() + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Token(e.to_string()))
    }

    /// Validate a token and return the caller's id
    ///
    /// Only HS256 is accepted, and ids must be positive.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            AuthError::InvalidToken(e.to_string())
        })?;

        if data.claims.user_id < 1 {
            return Err(AuthError::InvalidToken("non-positive user id".to_string()));
        }

        Ok(data.claims.user_id)
    }

    /// Resolve an `Authorization` header value to a user id
    pub fn resolve(&self, auth_header: Option<&str>) -> Result<UserId, AuthError> {
        let token = extract_bearer(auth_header)?;
        self.verify(token)
    }
}

/// Extract the token from a `Bearer <token>` header value
pub fn extract_bearer(auth_header: Option<&str>) -> Result<&str, AuthError> {
    let value = auth_header.ok_or(AuthError::MissingHeader)?;

    let mut parts = value.splitn(2, char::is_whitespace);
    match (parts.next(), parts.next()) {
        (Some("Bearer"), Some(token)) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::MalformedHeader),
    }
}

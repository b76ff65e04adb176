// Identity resolution and credentials
pub mod jwt;
pub mod password;

use thiserror::Error;

pub use jwt::{extract_bearer, TokenService};
pub use password::{hash_password, verify_password};

/// Errors raised while authenticating a caller
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Invalid Authorization header format, expected 'Bearer <token>'")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Token signing failed: {0}")]
    Token(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

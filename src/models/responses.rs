use serde::{Deserialize, Serialize};

use crate::models::domain::{Profile, SwipeOutcome, UserId};

/// Response for the swipe endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeResponse {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<UserId>,
}

impl From<SwipeOutcome> for SwipeResponse {
    fn from(outcome: SwipeOutcome) -> Self {
        Self {
            matched: outcome.matched,
            match_id: outcome.match_ref,
        }
    }
}

/// Response for account creation
///
/// The generated password is only ever returned here.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedAccountResponse {
    #[serde(flatten)]
    pub profile: Profile,
    pub email: String,
    pub password: String,
}

/// Response for login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

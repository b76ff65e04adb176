use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{Gender, SortMode};

/// Query string of the discovery endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoverQuery {
    #[serde(default)]
    pub age_min: Option<u32>,
    #[serde(default)]
    pub age_max: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

/// Normalized discovery parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoverParams {
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    pub gender: Gender,
    pub sort: SortMode,
}

impl From<DiscoverQuery> for DiscoverParams {
    /// Normalize the free-form fields; range checks happen in discovery
    fn from(query: DiscoverQuery) -> Self {
        Self {
            age_min: query.age_min,
            age_max: query.age_max,
            gender: query.gender.as_deref().map(Gender::from).unwrap_or_default(),
            sort: query.sort.as_deref().map(SortMode::from).unwrap_or_default(),
        }
    }
}

/// Swipe request body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SwipeRequest {
    #[validate(range(min = 1))]
    pub profile_id: i64,
    #[serde(default)]
    pub preference: String,
}

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

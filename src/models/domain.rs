use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a user row
pub type UserId = i64;

/// Self-declared gender of a profile
///
/// Unknown strings deserialize to `NotSpecified`, which also disables the
/// gender filter during discovery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender_type", rename_all = "snake_case")]
#[serde(from = "String")]
pub enum Gender {
    Male,
    Female,
    #[default]
    #[serde(rename = "Not Specified")]
    NotSpecified,
}

impl Gender {
    pub fn is_specified(&self) -> bool {
        !matches!(self, Gender::NotSpecified)
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        Gender::from(value.as_str())
    }
}

impl From<&str> for Gender {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::NotSpecified,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::NotSpecified => write!(f, "Not Specified"),
        }
    }
}

/// Read-model of a user as returned by discovery
///
/// Birth date and coordinates are loaded for age and distance computation
/// but never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: UserId,
    pub name: String,
    pub gender: Gender,
    #[serde(skip)]
    pub date_of_birth: NaiveDate,
    pub age: u32,
    #[serde(skip)]
    pub latitude: f64,
    #[serde(skip)]
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    pub likability: i32,
}

impl Profile {
    /// Recompute `age` as of `today`
    pub fn with_age_on(mut self, today: NaiveDate) -> Self {
        self.age = age_on(self.date_of_birth, today);
        self
    }
}

/// Whole years elapsed between `date_of_birth` and `today`
///
/// Birth dates in the future yield 0.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> u32 {
    if today < date_of_birth {
        return 0;
    }
    let mut years = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Account data written once at creation time
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
}

/// Stored login credentials for a user
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: UserId,
    pub email: String,
    pub password_hash: String,
}

/// State of a pair's swipe history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "relationship_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RelationshipState {
    /// One side said yes, the other has not answered
    Pending,
    Matched,
    Unmatched,
}

impl fmt::Display for RelationshipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipState::Pending => write!(f, "pending"),
            RelationshipState::Matched => write!(f, "matched"),
            RelationshipState::Unmatched => write!(f, "unmatched"),
        }
    }
}

/// Canonical key of an unordered pair of users
///
/// `PairKey::new(a, b) == PairKey::new(b, a)`, so a relationship is found
/// with a single equality lookup whichever side is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    low: UserId,
    high: UserId,
}

impl PairKey {
    pub fn new(a: UserId, b: UserId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn low(&self) -> UserId {
        self.low
    }

    pub fn high(&self) -> UserId {
        self.high
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.low == user_id || self.high == user_id
    }
}

/// Persisted relationship between two users
///
/// `initiator` is whoever swiped first; it is never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub initiator: UserId,
    pub recipient: UserId,
    pub state: RelationshipState,
}

impl Relationship {
    pub fn new(initiator: UserId, recipient: UserId, state: RelationshipState) -> Self {
        Self {
            initiator,
            recipient,
            state,
        }
    }

    pub fn key(&self) -> PairKey {
        PairKey::new(self.initiator, self.recipient)
    }
}

/// A binary swipe preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Preference {
    Yes,
    No,
}

impl FromStr for Preference {
    type Err = String;

    /// Only the exact wire values `YES` and `NO` are accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "YES" => Ok(Preference::Yes),
            "NO" => Ok(Preference::No),
            other => Err(format!("preference must be YES or NO, got {:?}", other)),
        }
    }
}

/// Result of an accepted swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeOutcome {
    pub matched: bool,
    pub match_ref: Option<UserId>,
}

impl SwipeOutcome {
    pub fn matched(target: UserId) -> Self {
        Self {
            matched: true,
            match_ref: Some(target),
        }
    }

    pub fn not_matched() -> Self {
        Self {
            matched: false,
            match_ref: None,
        }
    }
}

/// Ranking applied to discovery results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    /// Ascending id
    #[default]
    Unspecified,
    /// Descending likability
    Recommended,
    /// Ascending distance from the requester
    Distance,
}

impl From<&str> for SortMode {
    fn from(value: &str) -> Self {
        match value {
            "recommended" => SortMode::Recommended,
            "distance" => SortMode::Distance,
            _ => SortMode::Unspecified,
        }
    }
}

// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    age_on, Credentials, Gender, NewUser, PairKey, Preference, Profile, Relationship,
    RelationshipState, SortMode, SwipeOutcome, UserId,
};
pub use requests::{DiscoverParams, DiscoverQuery, LoginRequest, SwipeRequest};
pub use responses::{CreatedAccountResponse, ErrorResponse, HealthResponse, LoginResponse, SwipeResponse};

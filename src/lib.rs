//! Matchmaker - swipe matching and profile discovery service
//!
//! This library provides the relationship state machine behind swipes, the
//! candidate discovery query with age, gender and distance handling, and the
//! likability counter used for "recommended" ranking.

pub mod auth;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{distance::distance, ProfileDirectory, SwipeCommand, SwipeEngine};
pub use error::ApiError;
pub use models::{Gender, Preference, Profile, Relationship, RelationshipState, SwipeOutcome};

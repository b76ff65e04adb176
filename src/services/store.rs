use async_trait::async_trait;
use thiserror::Error;

use crate::core::filters::DiscoveryFilters;
use crate::models::{Credentials, NewUser, PairKey, Profile, Relationship, RelationshipState, UserId};

/// Errors raised by a persistence backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    /// A row with the same unique key was committed first
    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Access to the `users` relation
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Candidate profiles for `requester`
    ///
    /// Excludes the requester, everyone the requester initiated a
    /// relationship with, and everyone who initiated a relationship with the
    /// requester that is no longer pending. Applies every clause in
    /// `filters` and orders by its sort mode (ascending id by default,
    /// descending likability then id for `Recommended`). Ages are left for
    /// the caller to compute.
    async fn find_candidates(
        &self,
        requester: UserId,
        filters: &DiscoveryFilters,
    ) -> Result<Vec<Profile>, StoreError>;

    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError>;

    /// Atomically add `delta` to the user's likability
    async fn adjust_likability(&self, user_id: UserId, delta: i32) -> Result<(), StoreError>;

    /// Insert a new user, returning the stored profile
    async fn create_user(&self, user: NewUser) -> Result<Profile, StoreError>;

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Access to the `matches` relation, keyed by unordered pair
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    async fn get_relationship(&self, key: PairKey) -> Result<Option<Relationship>, StoreError>;

    /// Insert a new relationship
    ///
    /// Fails with [`StoreError::Duplicate`] when a row for the same pair
    /// already exists.
    async fn create_relationship(&self, relationship: &Relationship) -> Result<(), StoreError>;

    /// Change the state of an existing relationship
    ///
    /// Initiator and recipient are left untouched.
    async fn update_state(&self, key: PairKey, state: RelationshipState) -> Result<(), StoreError>;
}

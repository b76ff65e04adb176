use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

use crate::core::distance::{annotate_distances, sort_by_distance};
use crate::core::filters::{AgeBounds, DiscoveryFilters};
use crate::models::{DiscoverParams, Profile, SortMode, UserId};
use crate::services::store::{ProfileStore, StoreError};

/// Errors produced by discovery
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Invalid discovery request: {0}")]
    Validation(String),

    #[error("Profile {0} not found")]
    NotFound(UserId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Candidate discovery for a requesting user
///
/// # Pipeline
/// 1. Compile request parameters into filter clauses
/// 2. Query the store (exclusions, filters, storage-side order)
/// 3. Compute ages as of today
/// 4. Annotate distance from the requester's stored coordinates
/// 5. Sort by distance when asked
#[derive(Clone)]
pub struct ProfileDirectory {
    store: Arc<dyn ProfileStore>,
    bounds: AgeBounds,
}

impl ProfileDirectory {
    pub fn new(store: Arc<dyn ProfileStore>, bounds: AgeBounds) -> Self {
        Self { store, bounds }
    }

    pub fn bounds(&self) -> AgeBounds {
        self.bounds
    }

    /// Candidate profiles with ages filled in, without distances
    ///
    /// Any store error aborts the whole call.
    pub async fn find_candidates(
        &self,
        requester: UserId,
        filters: &DiscoveryFilters,
        today: NaiveDate,
    ) -> Result<Vec<Profile>, StoreError> {
        let profiles = self.store.find_candidates(requester, filters).await?;

        Ok(profiles
            .into_iter()
            .map(|profile| profile.with_age_on(today))
            .collect())
    }

    /// Full discovery: candidates, distances and ranking
    pub async fn discover(
        &self,
        requester: UserId,
        params: &DiscoverParams,
        today: NaiveDate,
    ) -> Result<Vec<Profile>, DiscoveryError> {
        if let (Some(min), Some(max)) = (params.age_min, params.age_max) {
            if max < min {
                return Err(DiscoveryError::Validation(format!(
                    "age_max ({}) must not be below age_min ({})",
                    max, min
                )));
            }
        }

        let me = self
            .store
            .get_profile(requester)
            .await?
            .ok_or(DiscoveryError::NotFound(requester))?;

        let filters = DiscoveryFilters::from_params(params, &self.bounds, today);
        let mut profiles = self.find_candidates(requester, &filters, today).await?;

        annotate_distances(&mut profiles, me.latitude, me.longitude);

        if params.sort == SortMode::Distance {
            sort_by_distance(&mut profiles);
        }

        tracing::info!(
            "Returning {} profiles for user {} (sort: {:?})",
            profiles.len(),
            requester,
            params.sort
        );

        Ok(profiles)
    }
}

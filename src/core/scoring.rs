use std::sync::Arc;

use crate::models::{Preference, UserId};
use crate::services::store::{ProfileStore, StoreError};

/// Likability change for a received swipe
#[inline]
pub fn likability_delta(preference: Preference) -> i32 {
    match preference {
        Preference::Yes => 1,
        Preference::No => -1,
    }
}

/// Adjusts the popularity counter stored with each profile
///
/// Scores are unbounded; each adjustment is a single atomic increment in
/// the store, so concurrent swipes on the same target add up.
#[derive(Clone)]
pub struct LikabilityScorer {
    store: Arc<dyn ProfileStore>,
}

impl LikabilityScorer {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    pub async fn adjust(&self, user_id: UserId, delta: i32) -> Result<(), StoreError> {
        self.store.adjust_likability(user_id, delta).await?;
        tracing::debug!("Adjusted likability of {} by {}", user_id, delta);
        Ok(())
    }

    /// Apply the adjustment for `target` receiving `preference`
    pub async fn record_swipe(&self, target: UserId, preference: Preference) -> Result<(), StoreError> {
        self.adjust(target, likability_delta(preference)).await
    }
}

use std::sync::Arc;
use thiserror::Error;

use crate::core::scoring::LikabilityScorer;
use crate::models::{
    PairKey, Preference, Relationship, RelationshipState, SwipeOutcome, UserId,
};
use crate::services::store::{ProfileStore, RelationshipStore, StoreError};

/// Errors produced while handling a swipe
#[derive(Debug, Error)]
pub enum SwipeError {
    #[error("Invalid swipe: {0}")]
    Validation(String),

    #[error("Profile {0} not found")]
    NotFound(UserId),

    /// The swipe repeats a decision the pair has already settled
    #[error("Already swiped this profile (relationship is {state})")]
    Conflict { state: RelationshipState },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A validated swipe from the caller's side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeCommand {
    pub target: UserId,
    pub preference: Preference,
}

impl SwipeCommand {
    /// Validate raw request fields
    ///
    /// The target must be positive and the preference exactly `YES` or `NO`.
    pub fn parse(target: UserId, preference: &str) -> Result<Self, SwipeError> {
        if target < 1 {
            return Err(SwipeError::Validation(format!(
                "profile_id must be positive, got {}",
                target
            )));
        }
        let preference = preference.parse::<Preference>().map_err(SwipeError::Validation)?;
        Ok(Self { target, preference })
    }
}

/// Write to perform after a swipe is accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// First swipe between the pair
    Create(Relationship),
    /// Existing row moves to a new state; initiator and recipient are kept
    Update(Relationship),
}

impl Transition {
    pub fn relationship(&self) -> &Relationship {
        match self {
            Transition::Create(rel) | Transition::Update(rel) => rel,
        }
    }
}

/// Relationship state policy for a single swipe
///
/// | current   | preference | result                                  |
/// |-----------|------------|-----------------------------------------|
/// | none      | yes        | Pending, actor becomes initiator        |
/// | none      | no         | Unmatched, actor becomes initiator      |
/// | Pending   | no         | Unmatched                               |
/// | Pending   | yes        | Matched if the actor is the recipient, else conflict |
/// | Matched   | yes        | conflict                                |
/// | Matched   | no         | Unmatched                               |
/// | Unmatched | yes / no   | conflict                                |
pub fn next_transition(
    current: Option<&Relationship>,
    actor: UserId,
    target: UserId,
    preference: Preference,
) -> Result<Transition, SwipeError> {
    let Some(current) = current else {
        let state = match preference {
            Preference::Yes => RelationshipState::Pending,
            Preference::No => RelationshipState::Unmatched,
        };
        return Ok(Transition::Create(Relationship::new(actor, target, state)));
    };

    let conflict = SwipeError::Conflict {
        state: current.state,
    };

    let state = match (current.state, preference) {
        (RelationshipState::Pending, Preference::No) => RelationshipState::Unmatched,
        (RelationshipState::Pending, Preference::Yes) if current.initiator == actor => {
            return Err(conflict)
        }
        (RelationshipState::Pending, Preference::Yes) => RelationshipState::Matched,
        (RelationshipState::Matched, Preference::Yes) => return Err(conflict),
        (RelationshipState::Matched, Preference::No) => RelationshipState::Unmatched,
        (RelationshipState::Unmatched, _) => return Err(conflict),
    };

    Ok(Transition::Update(Relationship {
        state,
        ..current.clone()
    }))
}

/// Orchestrates a swipe: read, decide, write, score
#[derive(Clone)]
pub struct SwipeEngine {
    profiles: Arc<dyn ProfileStore>,
    relationships: Arc<dyn RelationshipStore>,
    scorer: LikabilityScorer,
}

impl SwipeEngine {
    pub fn new(profiles: Arc<dyn ProfileStore>, relationships: Arc<dyn RelationshipStore>) -> Self {
        let scorer = LikabilityScorer::new(profiles.clone());
        Self {
            profiles,
            relationships,
            scorer,
        }
    }

    /// Apply `command` on behalf of `actor`
    ///
    /// Conflicts are detected after the relationship read and before any
    /// write. A likability failure after the relationship write leaves the
    /// new state committed and is reported as an error.
    pub async fn swipe(&self, actor: UserId, command: SwipeCommand) -> Result<SwipeOutcome, SwipeError> {
        let SwipeCommand { target, preference } = command;

        if actor == target {
            return Err(SwipeError::Validation("cannot swipe on your own profile".to_string()));
        }

        if self.profiles.get_profile(target).await?.is_none() {
            return Err(SwipeError::NotFound(target));
        }

        let key = PairKey::new(actor, target);
        let current = self.relationships.get_relationship(key).await?;

        let transition = match next_transition(current.as_ref(), actor, target, preference) {
            Ok(transition) => transition,
            Err(e) => {
                tracing::info!("Swipe {} -> {} ({:?}) rejected: {}", actor, target, preference, e);
                return Err(e);
            }
        };

        match &transition {
            Transition::Create(rel) => {
                self.relationships
                    .create_relationship(rel)
                    .await
                    .map_err(|e| match e {
                        // The other side committed a first swipe concurrently
                        StoreError::Duplicate(_) => SwipeError::Conflict {
                            state: rel.state,
                        },
                        other => SwipeError::Store(other),
                    })?;
            }
            Transition::Update(rel) => {
                self.relationships.update_state(key, rel.state).await?;
            }
        }

        if let Err(e) = self.scorer.record_swipe(target, preference).await {
            tracing::warn!(
                "Relationship {} -> {} committed but likability update failed: {}",
                actor,
                target,
                e
            );
            return Err(e.into());
        }

        let state = transition.relationship().state;
        tracing::info!("Swipe {} -> {} ({:?}): {}", actor, target, preference, state);

        if state == RelationshipState::Matched {
            Ok(SwipeOutcome::matched(target))
        } else {
            Ok(SwipeOutcome::not_matched())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filters::DiscoveryFilters;
    use crate::models::{Credentials, Gender, NewUser, Profile};
    use crate::services::InMemoryStore;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    const A: UserId = 1;
    const B: UserId = 2;

    fn rel(initiator: UserId, recipient: UserId, state: RelationshipState) -> Relationship {
        Relationship::new(initiator, recipient, state)
    }

    #[test]
    fn test_first_swipe_creates_row() {
        let t = next_transition(None, A, B, Preference::Yes).unwrap();
        assert_eq!(t, Transition::Create(rel(A, B, RelationshipState::Pending)));

        let t = next_transition(None, A, B, Preference::No).unwrap();
        assert_eq!(t, Transition::Create(rel(A, B, RelationshipState::Unmatched)));
    }

    #[test]
    fn test_recipient_yes_matches() {
        let current = rel(A, B, RelationshipState::Pending);
        let t = next_transition(Some(&current), B, A, Preference::Yes).unwrap();
        assert_eq!(t, Transition::Update(rel(A, B, RelationshipState::Matched)));
    }

    #[test]
    fn test_initiator_repeat_yes_conflicts() {
        let current = rel(A, B, RelationshipState::Pending);
        let err = next_transition(Some(&current), A, B, Preference::Yes).unwrap_err();
        assert!(matches!(err, SwipeError::Conflict { state: RelationshipState::Pending }));
    }

    #[test]
    fn test_pending_no_unmatches_from_either_side() {
        let current = rel(A, B, RelationshipState::Pending);
        for actor in [A, B] {
            let other = if actor == A { B } else { A };
            let t = next_transition(Some(&current), actor, other, Preference::No).unwrap();
            assert_eq!(t, Transition::Update(rel(A, B, RelationshipState::Unmatched)));
        }
    }

    #[test]
    fn test_matched_transitions() {
        let current = rel(A, B, RelationshipState::Matched);
        assert!(matches!(
            next_transition(Some(&current), B, A, Preference::Yes),
            Err(SwipeError::Conflict { .. })
        ));
        let t = next_transition(Some(&current), B, A, Preference::No).unwrap();
        assert_eq!(t.relationship().state, RelationshipState::Unmatched);
        assert_eq!(t.relationship().initiator, A);
    }

    #[test]
    fn test_unmatched_is_terminal() {
        let current = rel(A, B, RelationshipState::Unmatched);
        for actor in [A, B] {
            let other = if actor == A { B } else { A };
            for pref in [Preference::Yes, Preference::No] {
                assert!(matches!(
                    next_transition(Some(&current), actor, other, pref),
                    Err(SwipeError::Conflict { state: RelationshipState::Unmatched })
                ));
            }
        }
    }

    #[test]
    fn test_command_validation() {
        assert!(matches!(SwipeCommand::parse(0, "YES"), Err(SwipeError::Validation(_))));
        assert!(matches!(SwipeCommand::parse(-4, "NO"), Err(SwipeError::Validation(_))));
        assert!(matches!(SwipeCommand::parse(3, "MAYBE"), Err(SwipeError::Validation(_))));
        assert_eq!(
            SwipeCommand::parse(3, "NO").unwrap(),
            SwipeCommand { target: 3, preference: Preference::No }
        );
    }

    /// Store whose likability updates always fail
    struct FailingScores(Arc<InMemoryStore>);

    #[async_trait]
    impl ProfileStore for FailingScores {
        async fn find_candidates(
            &self,
            requester: UserId,
            filters: &DiscoveryFilters,
        ) -> Result<Vec<Profile>, StoreError> {
            self.0.find_candidates(requester, filters).await
        }

        async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
            self.0.get_profile(user_id).await
        }

        async fn adjust_likability(&self, _user_id: UserId, _delta: i32) -> Result<(), StoreError> {
            Err(StoreError::InvalidData("score column unavailable".to_string()))
        }

        async fn create_user(&self, user: NewUser) -> Result<Profile, StoreError> {
            self.0.create_user(user).await
        }

        async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError> {
            self.0.find_credentials(email).await
        }

        async fn health_check(&self) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    async fn seed(store: &InMemoryStore, email: &str) -> UserId {
        store
            .create_user(NewUser {
                email: email.to_string(),
                password_hash: String::new(),
                name: email.to_string(),
                gender: Gender::NotSpecified,
                date_of_birth: NaiveDate::from_ymd_opt(1992, 5, 5).unwrap(),
                latitude: 0.0,
                longitude: 0.0,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_score_failure_keeps_relationship() {
        let store = Arc::new(InMemoryStore::new());
        let a = seed(&store, "a@example.com").await;
        let b = seed(&store, "b@example.com").await;

        let engine = SwipeEngine::new(Arc::new(FailingScores(store.clone())), store.clone());
        let err = engine
            .swipe(a, SwipeCommand::parse(b, "YES").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, SwipeError::Store(_)));
        let rel = store.relationship(a, b).await.unwrap();
        assert_eq!(rel.state, RelationshipState::Pending);
        assert_eq!(store.likability(b).await, Some(0));
    }

    #[tokio::test]
    async fn test_unknown_target_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let a = seed(&store, "a@example.com").await;

        let engine = SwipeEngine::new(store.clone(), store.clone());
        let err = engine
            .swipe(a, SwipeCommand::parse(99, "YES").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, SwipeError::NotFound(99)));
        assert_eq!(store.relationship_count().await, 0);
    }

    #[tokio::test]
    async fn test_self_swipe_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let a = seed(&store, "a@example.com").await;

        let engine = SwipeEngine::new(store.clone(), store.clone());
        let err = engine
            .swipe(a, SwipeCommand::parse(a, "YES").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, SwipeError::Validation(_)));
        assert_eq!(store.likability(a).await, Some(0));
    }

    /// Relationship store that never sees existing rows, as when a
    /// concurrent first swipe commits between read and insert
    struct StaleReads(Arc<InMemoryStore>);

    #[async_trait]
    impl RelationshipStore for StaleReads {
        async fn get_relationship(&self, _key: PairKey) -> Result<Option<Relationship>, StoreError> {
            Ok(None)
        }

        async fn create_relationship(&self, relationship: &Relationship) -> Result<(), StoreError> {
            self.0.create_relationship(relationship).await
        }

        async fn update_state(&self, key: PairKey, state: RelationshipState) -> Result<(), StoreError> {
            self.0.update_state(key, state).await
        }
    }

    #[tokio::test]
    async fn test_racing_first_swipe_conflicts() {
        let store = Arc::new(InMemoryStore::new());
        let a = seed(&store, "a@example.com").await;
        let b = seed(&store, "b@example.com").await;

        let engine = SwipeEngine::new(store.clone(), store.clone());
        engine.swipe(b, SwipeCommand::parse(a, "YES").unwrap()).await.unwrap();

        let racing = SwipeEngine::new(store.clone(), Arc::new(StaleReads(store.clone())));
        let err = racing
            .swipe(a, SwipeCommand::parse(b, "YES").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, SwipeError::Conflict { state: RelationshipState::Pending }));
        assert_eq!(store.relationship_count().await, 1);
        assert_eq!(store.relationship(a, b).await.unwrap().initiator, b);
        assert_eq!(store.likability(b).await, Some(0));
        assert_eq!(store.likability(a).await, Some(1));
    }
}

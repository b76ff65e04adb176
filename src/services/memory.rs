use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::core::filters::DiscoveryFilters;
use crate::models::{
    Credentials, NewUser, PairKey, Profile, Relationship, RelationshipState, SortMode, UserId,
};
use crate::services::store::{ProfileStore, RelationshipStore, StoreError};

struct StoredUser {
    profile: Profile,
    email: String,
    password_hash: String,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, StoredUser>,
    matches: HashMap<PairKey, Relationship>,
    next_id: UserId,
}

/// In-process store implementing both relations
///
/// Used by tests and by `database.backend = "memory"`. Each method takes the
/// lock once, so a single call is atomic like its SQL counterpart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a pair, for inspection in tests
    pub async fn relationship(&self, a: UserId, b: UserId) -> Option<Relationship> {
        self.tables.read().await.matches.get(&PairKey::new(a, b)).cloned()
    }

    pub async fn relationship_count(&self) -> usize {
        self.tables.read().await.matches.len()
    }

    pub async fn likability(&self, user_id: UserId) -> Option<i32> {
        self.tables
            .read()
            .await
            .users
            .get(&user_id)
            .map(|u| u.profile.likability)
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn find_candidates(
        &self,
        requester: UserId,
        filters: &DiscoveryFilters,
    ) -> Result<Vec<Profile>, StoreError> {
        let tables = self.tables.read().await;

        let excluded = |candidate: UserId| -> bool {
            match tables.matches.get(&PairKey::new(requester, candidate)) {
                Some(rel) if rel.initiator == requester => true,
                Some(rel) => rel.state != RelationshipState::Pending,
                None => false,
            }
        };

        let mut profiles: Vec<Profile> = tables
            .users
            .values()
            .map(|u| &u.profile)
            .filter(|p| p.id != requester)
            .filter(|p| !excluded(p.id))
            .filter(|p| filters.matches(p))
            .cloned()
            .collect();

        // BTreeMap iteration is already ascending by id
        if filters.sort() == SortMode::Recommended {
            profiles.sort_by(|a, b| b.likability.cmp(&a.likability).then(a.id.cmp(&b.id)));
        }

        Ok(profiles)
    }

    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .get(&user_id)
            .map(|u| u.profile.clone()))
    }

    async fn adjust_likability(&self, user_id: UserId, delta: i32) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.get_mut(&user_id) {
            // Postgres rejects an out-of-range INTEGER the same way
            user.profile.likability = user.profile.likability.checked_add(delta).ok_or_else(|| {
                StoreError::InvalidData(format!("likability of user {} out of range", user_id))
            })?;
        }
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<Profile, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(format!("email {}", user.email)));
        }

        tables.next_id += 1;
        let id = tables.next_id;

        let profile = Profile {
            id,
            name: user.name,
            gender: user.gender,
            date_of_birth: user.date_of_birth,
            age: 0,
            latitude: user.latitude,
            longitude: user.longitude,
            distance: None,
            likability: 0,
        };

        tables.users.insert(
            id,
            StoredUser {
                profile: profile.clone(),
                email: user.email,
                password_hash: user.password_hash,
            },
        );

        Ok(profile)
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email == email)
            .map(|u| Credentials {
                user_id: u.profile.id,
                email: u.email.clone(),
                password_hash: u.password_hash.clone(),
            }))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[async_trait]
impl RelationshipStore for InMemoryStore {
    async fn get_relationship(&self, key: PairKey) -> Result<Option<Relationship>, StoreError> {
        Ok(self.tables.read().await.matches.get(&key).cloned())
    }

    async fn create_relationship(&self, relationship: &Relationship) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let key = relationship.key();

        if tables.matches.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "relationship {}-{}",
                key.low(),
                key.high()
            )));
        }

        tables.matches.insert(key, relationship.clone());
        Ok(())
    }

    async fn update_state(&self, key: PairKey, state: RelationshipState) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        match tables.matches.get_mut(&key) {
            Some(rel) => {
                rel.state = state;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!(
                "relationship {}-{}",
                key.low(),
                key.high()
            ))),
        }
    }
}

// Route exports
pub mod identity;
pub mod matches;
pub mod users;

use actix_web::web;
use std::sync::Arc;

use crate::auth::TokenService;
use crate::core::{AgeBounds, ProfileDirectory, SwipeEngine};
use crate::services::{AccountService, ProfileStore, RelationshipStore};

pub use identity::AuthenticatedUser;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileStore>,
    pub directory: ProfileDirectory,
    pub swipes: SwipeEngine,
    pub accounts: AccountService,
    pub tokens: TokenService,
}

impl AppState {
    /// Wire the core services over one store holding both relations
    pub fn new<S>(store: Arc<S>, tokens: TokenService, bounds: AgeBounds, password_iterations: u32) -> Self
    where
        S: ProfileStore + RelationshipStore + 'static,
    {
        let profiles: Arc<dyn ProfileStore> = store.clone();
        let relationships: Arc<dyn RelationshipStore> = store;

        Self {
            directory: ProfileDirectory::new(profiles.clone(), bounds),
            swipes: SwipeEngine::new(profiles.clone(), relationships),
            accounts: AccountService::new(profiles.clone(), tokens.clone(), password_iterations),
            profiles,
            tokens,
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(users::configure),
    );
}

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::config::Config;
use crate::db::memory::MemoryStore;
use crate::db::{AuthStore, GameStore};
use crate::session::{ConnectionRegistry, SessionCoordinator};

/// Everything a handler needs, shared through an `Extension` layer.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub auth: Arc<Authenticator>,
    pub games: Arc<dyn GameStore>,
    pub sessions: Arc<SessionCoordinator>,
}

impl AppState {
    pub fn new(config: Config, users: Arc<dyn AuthStore>, games: Arc<dyn GameStore>) -> Self {
        let auth = Arc::new(Authenticator::new(users, &config));
        let sessions = Arc::new(SessionCoordinator::new(
            auth.clone(),
            games.clone(),
            Arc::new(ConnectionRegistry::new()),
        ));
        Self {
            config,
            auth,
            games,
            sessions,
        }
    }

    /// State backed by a fresh [`MemoryStore`].
    pub fn in_memory(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store)
    }
}

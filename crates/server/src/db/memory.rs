use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AuthStore, GameRecord, GameStore, User};
use crate::error::AppError;

#[derive(Default)]
struct Games {
    next_id: i64,
    records: BTreeMap<i64, GameRecord>,
}

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    sessions: RwLock<HashMap<String, String>>,
    games: RwLock<Games>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthStore for MemoryStore {
    async fn create_user(&self, user: User) -> Result<bool, AppError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Ok(false);
        }
        users.insert(user.username.clone(), user);
        Ok(true)
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn create_session(&self, token: &str, username: &str) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(token) {
            return Err(AppError::Internal("session token already exists".into()));
        }
        sessions.insert(token.to_string(), username.to_string());
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<String>, AppError> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> Result<bool, AppError> {
        Ok(self.sessions.write().await.remove(token).is_some())
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.users.write().await.clear();
        self.sessions.write().await.clear();
        Ok(())
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn create_game(&self, game_name: &str) -> Result<i64, AppError> {
        let mut games = self.games.write().await;
        games.next_id += 1;
        let id = games.next_id;
        games.records.insert(id, GameRecord::new(id, game_name));
        Ok(id)
    }

    async fn get_game(&self, game_id: i64) -> Result<Option<GameRecord>, AppError> {
        Ok(self.games.read().await.records.get(&game_id).cloned())
    }

    async fn list_games(&self) -> Result<Vec<GameRecord>, AppError> {
        Ok(self.games.read().await.records.values().cloned().collect())
    }

    async fn update_game(&self, game_id: i64, record: &GameRecord) -> Result<(), AppError> {
        let mut games = self.games.write().await;
        match games.records.get_mut(&game_id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("game {game_id} does not exist"))),
        }
    }

    async fn clear(&self) -> Result<(), AppError> {
        let mut games = self.games.write().await;
        games.records.clear();
        games.next_id = 0;
        Ok(())
    }
}

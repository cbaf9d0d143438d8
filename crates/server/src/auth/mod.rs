pub mod jwt;
pub mod middleware;
pub mod password;

use std::sync::Arc;

use argon2::password_hash::rand_core::{OsRng, RngCore};

use crate::config::Config;
use crate::db::AuthStore;
use crate::error::AppError;

/// Issues, resolves and revokes auth tokens.
///
/// A token is accepted only while its signature and expiry check out AND a
/// session row for it exists, so logging out takes effect immediately.
pub struct Authenticator {
    store: Arc<dyn AuthStore>,
    secret: String,
    expire_hours: i64,
}

impl Authenticator {
    pub fn new(store: Arc<dyn AuthStore>, config: &Config) -> Self {
        Self {
            store,
            secret: config.jwt_secret.clone(),
            expire_hours: config.jwt_expire_hours,
        }
    }

    pub fn store(&self) -> &Arc<dyn AuthStore> {
        &self.store
    }

    /// Mint a token for `username` and record the session. The nonce is
    /// random, so tokens stay distinct across restarts.
    pub async fn issue(&self, username: &str) -> Result<String, AppError> {
        let nonce = OsRng.next_u64();
        let token = jwt::create_token(username, nonce, &self.secret, self.expire_hours)
            .map_err(|e| AppError::Internal(format!("Token error: {e}")))?;
        self.store.create_session(&token, username).await?;
        Ok(token)
    }

    /// The identity behind `token`, or `None` if it is not a live session.
    pub async fn resolve_identity(&self, token: &str) -> Result<Option<String>, AppError> {
        let Some(claims) = jwt::verify_token(token, &self.secret) else {
            return Ok(None);
        };
        let username = self.store.get_session(token).await?;
        Ok(username.filter(|u| *u == claims.sub))
    }

    /// Drop the session. Returns false if it was not live.
    pub async fn revoke(&self, token: &str) -> Result<bool, AppError> {
        if self.resolve_identity(token).await?.is_none() {
            return Ok(false);
        }
        self.store.delete_session(token).await
    }
}

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from the Authorization header.
/// Use as an extractor in route handlers that require auth.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = parts
            .extensions
            .get::<AppState>()
            .ok_or(AppError::Internal("Missing app state".into()))?
            .clone();

        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        // Clients send either the bare token or "Bearer <token>".
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .unwrap_or(header)
            .trim();

        let username = state
            .auth
            .resolve_identity(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser {
            username,
            token: token.to_string(),
        })
    }
}

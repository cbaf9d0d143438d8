use axum::{Extension, Json};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::auth::{middleware::AuthUser, password};
use crate::db::User;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub username: String,
    pub auth_token: String,
}

fn required(field: Option<String>, name: &str) -> Result<String, AppError> {
    field
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{name} is required")))
}

fn validate_username(username: &str) -> Result<(), AppError> {
    let username_re = Regex::new(r"^[A-Za-z0-9_]{3,20}$")
        .map_err(|e| AppError::Internal(format!("Username pattern: {e}")))?;
    if !username_re.is_match(username) {
        return Err(AppError::BadRequest(
            "Username must be 3-20 letters, numbers, or underscores".into(),
        ));
    }
    Ok(())
}

/// POST /user
pub async fn register(
    Extension(state): Extension<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let username = required(req.username, "username")?;
    let password = required(req.password, "password")?;
    let email = required(req.email, "email")?;
    validate_username(&username)?;

    let password_hash = password::hash_password(&password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {e}")))?;

    let created = state
        .auth
        .store()
        .create_user(User {
            username: username.clone(),
            password_hash,
            email,
        })
        .await?;
    if !created {
        return Err(AppError::Forbidden("already taken".into()));
    }

    let auth_token = state.auth.issue(&username).await?;
    tracing::info!(user = %username, "Registered");
    Ok(Json(AuthResponse { username, auth_token }))
}

/// POST /session
pub async fn login(
    Extension(state): Extension<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let username = required(req.username, "username")?;
    let password = required(req.password, "password")?;

    let user = state
        .auth
        .store()
        .get_user(&username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = password::verify_password(&password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verify error: {e}")))?;
    if !valid {
        return Err(AppError::Unauthorized);
    }

    let auth_token = state.auth.issue(&user.username).await?;
    Ok(Json(AuthResponse {
        username: user.username,
        auth_token,
    }))
}

/// DELETE /session
pub async fn logout(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> Result<Json<JsonValue>, AppError> {
    if !state.auth.revoke(&user.token).await? {
        return Err(AppError::Unauthorized);
    }
    Ok(Json(json!({})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("alice_99").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("a".repeat(21).as_str()).is_err());
        assert!(validate_username("bad name").is_err());
    }

    #[test]
    fn test_blank_fields_are_missing() {
        assert!(required(Some("  ".into()), "email").is_err());
        assert!(required(None, "email").is_err());
        assert_eq!(required(Some("x".into()), "email").unwrap(), "x");
    }
}

pub mod auth;
pub mod games;
pub mod ws;

use axum::{Extension, Json};
use serde_json::{json, Value as JsonValue};

use crate::error::AppError;
use crate::state::AppState;

/// GET /health
pub async fn health_check() -> Json<JsonValue> {
    Json(json!({ "status": "ok" }))
}

/// DELETE /db
pub async fn clear_database(
    Extension(state): Extension<AppState>,
) -> Result<Json<JsonValue>, AppError> {
    state.auth.store().clear().await?;
    state.games.clear().await?;
    tracing::warn!("Cleared all stores");
    Ok(Json(json!({})))
}

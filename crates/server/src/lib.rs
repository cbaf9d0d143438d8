pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

use axum::{
    routing::{delete, get, post},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};

pub use state::AppState;

/// All REST routes plus the session socket, with `state` shared to handlers.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health_check))
        .route("/user", post(routes::auth::register))
        .route(
            "/session",
            post(routes::auth::login).delete(routes::auth::logout),
        )
        .route(
            "/game",
            get(routes::games::list_games)
                .post(routes::games::create_game)
                .put(routes::games::join_game),
        )
        .route("/db", delete(routes::clear_database))
        .route("/ws", get(routes::ws::ws_handler))
        .layer(Extension(state))
        .layer(cors)
}

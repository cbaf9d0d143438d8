use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    /// Postgres URL; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expire_hours: i64,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            jwt_secret: env::var("JWT_SECRET_KEY")
                .unwrap_or_else(|_| "dev-secret-key-change-in-production".to_string()),
            jwt_expire_hours: env::var("JWT_EXPIRE_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(168), // 7 days
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        }
    }

    /// In-memory configuration for tests and local experiments.
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            jwt_secret: "test-secret".to_string(),
            jwt_expire_hours: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
        }
    }
}

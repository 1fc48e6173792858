use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_path: String,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("TASKNEST_BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            database_path: env::var("TASKNEST_DB_PATH").unwrap_or_else(|_| "tasks.db".to_string()),
            jwt_secret: env::var("TASKNEST_JWT_SECRET")
                .unwrap_or_else(|_| "dev-secret-change-me".to_string()),
            token_ttl_secs: env::var("TASKNEST_TOKEN_TTL_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(3600),
        }
    }
}

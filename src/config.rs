// src/config.rs

use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    /// Row cap applied to the flat response query. 0 means no limit.
    pub max_rows: i64,
    /// Upper bound on the database fetch, in seconds. Large contests can
    /// produce very wide result sets.
    pub fetch_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let max_rows = env::var("MAX_ROWS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        let fetch_timeout_secs = env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        Self {
            database_url,
            rust_log,
            max_rows,
            fetch_timeout_secs,
        }
    }
}

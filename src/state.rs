// src/state.rs

use crate::config::Config;
use crate::queries::ReportQueries;
use axum::extract::FromRef;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub queries: ReportQueries,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for ReportQueries {
    fn from_ref(state: &AppState) -> Self {
        state.queries.clone()
    }
}

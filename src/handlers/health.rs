// src/handlers/health.rs

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Local;
use sqlx::PgPool;

/// Health check endpoint. Reports database connectivity without failing the
/// request: a dead database degrades the status, it does not 500.
pub async fn health_check(State(pool): State<PgPool>) -> impl IntoResponse {
    let database_connected = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&pool)
        .await
        .is_ok();

    Json(serde_json::json!({
        "status": if database_connected { "healthy" } else { "degraded" },
        "database_connected": database_connected,
        "timestamp": Local::now().to_rfc3339(),
    }))
}

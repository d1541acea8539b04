// src/routes.rs

use axum::{Router, http::Method, routing::get};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{health, reports};
use crate::state::AppState;

/// Assembles the main application router.
///
/// * Mounts the report routes under /api/reports plus the health probe.
/// * Applies global middleware (Trace, CORS). Only GET is allowed since the
///   whole service is read-only.
/// * Injects global state (pool, config, query component).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    let report_routes = Router::new()
        .route("/student-responses", get(reports::student_responses_report))
        .route("/test-dates/{contest_id}", get(reports::test_dates))
        .route("/contest-info/{contest_id}", get(reports::contest_info));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/reports", report_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

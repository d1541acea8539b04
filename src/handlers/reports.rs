// src/handlers/reports.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    queries::ReportQueries,
    report::{ExcelRenderer, pivot},
};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Query parameters for the student responses report.
#[derive(Debug, Deserialize, Validate)]
pub struct ReportParams {
    #[validate(range(min = 1))]
    pub contest_id: i64,
    pub test_date: NaiveDate,
    #[validate(range(min = 1))]
    pub grade: Option<i64>,
    #[validate(range(min = 1))]
    pub school_id: Option<i64>,
}

/// Generates the student responses workbook for one contest and test date.
///
/// * Validates the contest exists (404 otherwise).
/// * Fetches the flat result set, pivots it to one row per student, and
///   renders the workbook in memory.
/// * Returns the buffer as an attachment with a timestamped filename.
pub async fn student_responses_report(
    State(pool): State<PgPool>,
    State(queries): State<ReportQueries>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, AppError> {
    params
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if !queries.contest_exists(&pool, params.contest_id).await? {
        return Err(AppError::NotFound(format!(
            "Contest with ID {} not found",
            params.contest_id
        )));
    }

    let contest_info = queries.contest_info(&pool, params.contest_id).await?;

    let records = queries
        .fetch_student_responses(
            &pool,
            params.contest_id,
            params.test_date,
            params.grade,
            params.school_id,
        )
        .await?;

    let table = pivot(&records)?;
    if table.duplicates_dropped > 0 {
        tracing::warn!(
            "Dropped {} duplicate (student, question) records for contest {}",
            table.duplicates_dropped,
            params.contest_id
        );
    }

    let renderer = ExcelRenderer::new();
    let buffer = renderer.render(&table, params.contest_id, contest_info.as_ref())?;

    let filename = format!(
        "student_responses_contest_{}_{}.xlsx",
        params.contest_id,
        Local::now().format("%Y%m%d_%H%M%S")
    );

    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={filename}"),
        ),
    ];

    Ok((headers, buffer))
}

/// Lists the distinct test dates recorded for a contest, newest first.
pub async fn test_dates(
    State(pool): State<PgPool>,
    State(queries): State<ReportQueries>,
    Path(contest_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !queries.contest_exists(&pool, contest_id).await? {
        return Err(AppError::NotFound(format!(
            "Contest with ID {contest_id} not found"
        )));
    }

    let dates: Vec<String> = queries
        .available_test_dates(&pool, contest_id)
        .await?
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();

    Ok(Json(serde_json::json!({
        "contest_id": contest_id,
        "total_dates": dates.len(),
        "test_dates": dates,
    })))
}

/// Returns contest metadata and its distinct question count.
pub async fn contest_info(
    State(pool): State<PgPool>,
    State(queries): State<ReportQueries>,
    Path(contest_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !queries.contest_exists(&pool, contest_id).await? {
        return Err(AppError::NotFound(format!(
            "Contest with ID {contest_id} not found"
        )));
    }

    let info = queries.contest_info(&pool, contest_id).await?;
    let question_count = queries.question_count(&pool, contest_id).await?;

    Ok(Json(serde_json::json!({
        "contest_id": contest_id,
        "contest_info": info,
        "question_count": question_count,
    })))
}

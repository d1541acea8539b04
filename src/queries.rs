// src/queries.rs

//! Read-only queries against the analytics store. Every statement here is a
//! SELECT; this service never writes.
//!
//! `ReportQueries` is a plain stateless component built from config and
//! passed through application state. It owns the two fetch knobs (row cap
//! and timeout) so neither leaks into the pivot or render steps, which are
//! pure in-memory transforms.

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Duration;
use tokio::time::timeout;

use crate::config::Config;
use crate::error::AppError;
use crate::models::record::{ContestInfo, FlatResponseRecord};
use crate::utils::html::strip_markup;

#[derive(Debug, Clone)]
pub struct ReportQueries {
    /// 0 means no limit.
    max_rows: i64,
    fetch_timeout: Duration,
}

impl ReportQueries {
    pub fn from_config(config: &Config) -> Self {
        ReportQueries {
            max_rows: config.max_rows,
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
        }
    }

    /// Fetches the flat result set for one contest administration: one row
    /// per (student, question) pair, ordered by school, student name and
    /// question id. The sentinel defaults for absent question metadata are
    /// applied in SQL; editor markup on the correct answer is stripped here
    /// after the fetch.
    ///
    /// This is the only blocking point of a report generation, so it is the
    /// one call wrapped in a timeout.
    pub async fn fetch_student_responses(
        &self,
        pool: &PgPool,
        contest_id: i64,
        test_date: NaiveDate,
        grade: Option<i64>,
        school_id: Option<i64>,
    ) -> Result<Vec<FlatResponseRecord>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT
                COALESCE(ts.test_start_datetime, cc.exam_start_datetime) AS test_date,
                s.id AS school_id,
                s.school_name,
                u.login_id AS student_id,
                u.first_name,
                u.last_name,
                u.gender,
                u.grade,
                COALESCE(reg.region_name, 'N/A') AS region,
                tr.question_id,
                COALESCE(qb.question_type, 'N/A') AS question_type,
                COALESCE(subj.subject_name, 'N/A') AS subject,
                COALESCE(lvl.lov_name, 'N/A') AS level,
                CASE
                    WHEN tr.user_answer IS NULL OR tr.user_answer = '' THEN 'Not Answered'
                    ELSE tr.user_answer
                END AS student_answer,
                COALESCE(qb.answer, 'N/A') AS correct_answer,
                COALESCE(tr.credits, 0)::DOUBLE PRECISION AS score
            FROM cct_test_results tr
            JOIN users u ON tr.user_id = u.user_id
            JOIN schools s ON u.school_id = s.id
            JOIN contest_creations cc ON tr.contest_creation_id = cc.contest_creation_id
            LEFT JOIN cct_test_students ts
                ON tr.user_id = ts.user_id
                AND tr.contest_creation_id = ts.contest_creation_id
            LEFT JOIN qbank_master qb ON tr.question_id = qb.question_id
            LEFT JOIN subjects subj ON qb.subject_id = subj.subject_id
            LEFT JOIN lov lvl ON qb.level = lvl.lov_id
            LEFT JOIN regions reg ON s.region_id = reg.region_id
            WHERE tr.contest_creation_id = "#,
        );
        builder.push_bind(contest_id);
        builder.push(" AND COALESCE(ts.test_start_datetime, cc.exam_start_datetime)::DATE = ");
        builder.push_bind(test_date);

        if let Some(grade) = grade {
            builder.push(" AND u.grade = ");
            builder.push_bind(grade);
        }
        if let Some(school_id) = school_id {
            builder.push(" AND s.id = ");
            builder.push_bind(school_id);
        }

        builder.push(" ORDER BY s.school_name, u.last_name, u.first_name, tr.question_id");

        if self.max_rows > 0 {
            builder.push(" LIMIT ");
            builder.push_bind(self.max_rows);
        }

        let fetch = builder
            .build_query_as::<FlatResponseRecord>()
            .fetch_all(pool);

        let mut records = timeout(self.fetch_timeout, fetch)
            .await
            .map_err(|_| {
                AppError::InternalServerError(format!(
                    "student response fetch exceeded {}s",
                    self.fetch_timeout.as_secs()
                ))
            })??;

        for record in &mut records {
            record.correct_answer = strip_markup(&record.correct_answer);
        }

        Ok(records)
    }

    /// Checks whether a contest exists at all.
    pub async fn contest_exists(&self, pool: &PgPool, contest_id: i64) -> Result<bool, AppError> {
        let found = sqlx::query_scalar::<_, i32>(
            "SELECT 1 FROM contest_creations WHERE contest_creation_id = $1 LIMIT 1",
        )
        .bind(contest_id)
        .fetch_optional(pool)
        .await?;

        Ok(found.is_some())
    }

    /// Basic contest metadata for report headers.
    pub async fn contest_info(
        &self,
        pool: &PgPool,
        contest_id: i64,
    ) -> Result<Option<ContestInfo>, AppError> {
        let info = sqlx::query_as::<_, ContestInfo>(
            r#"
            SELECT
                contest_creation_id AS contest_id,
                exam_start_datetime AS exam_start,
                exam_end_datetime AS exam_end
            FROM contest_creations
            WHERE contest_creation_id = $1
            "#,
        )
        .bind(contest_id)
        .fetch_optional(pool)
        .await?;

        Ok(info)
    }

    /// Number of distinct questions recorded for a contest.
    pub async fn question_count(&self, pool: &PgPool, contest_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT tr.question_id)
            FROM cct_test_results tr
            WHERE tr.contest_creation_id = $1
            "#,
        )
        .bind(contest_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Distinct test dates for a contest, newest first. Used to populate a
    /// date picker before downloading the report.
    pub async fn available_test_dates(
        &self,
        pool: &PgPool,
        contest_id: i64,
    ) -> Result<Vec<NaiveDate>, AppError> {
        let dates = sqlx::query_scalar::<_, NaiveDate>(
            r#"
            SELECT DISTINCT
                COALESCE(ts.test_start_datetime, cc.exam_start_datetime)::DATE AS test_date
            FROM cct_test_results tr
            JOIN contest_creations cc ON tr.contest_creation_id = cc.contest_creation_id
            LEFT JOIN cct_test_students ts
                ON tr.user_id = ts.user_id
                AND tr.contest_creation_id = ts.contest_creation_id
            WHERE tr.contest_creation_id = $1
            ORDER BY test_date DESC
            "#,
        )
        .bind(contest_id)
        .fetch_all(pool)
        .await?;

        Ok(dates)
    }
}

// src/models/record.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// One student's answer to one question within one contest administration.
/// This is the flat shape the response query yields, one row per
/// (student, question) pair; the pivot step turns it into one row per student.
///
/// The query applies the sentinel defaults in SQL: `'N/A'` for absent
/// question metadata, `'Not Answered'` for a null or empty answer, `0` for
/// an absent score. `gender` and `grade` stay nullable since the source
/// records genuinely omit them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FlatResponseRecord {
    pub test_date: NaiveDateTime,
    pub school_id: i64,
    pub school_name: String,
    /// The stable login identifier, NOT the internal numeric user id.
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub grade: Option<i64>,
    pub region: String,
    pub question_id: i64,
    pub question_type: String,
    pub subject: String,
    pub level: String,
    pub student_answer: String,
    pub correct_answer: String,
    pub score: f64,
}

/// Basic contest metadata, used for report headers and validation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContestInfo {
    pub contest_id: i64,
    pub exam_start: Option<NaiveDateTime>,
    pub exam_end: Option<NaiveDateTime>,
}

// src/report/pivot.rs

//! Pivot Engine: transforms the flat query result (one row per
//! student-question pair) into a wide table (one row per student, with a
//! numbered block of seven columns per question).
//!
//! Algorithm, two passes over the input:
//! 1. Collect the distinct students in first-seen order and the distinct
//!    question ids. Question ids sorted ascending become slots 1..N, so the
//!    slot mapping is identical for any permutation of the same input.
//! 2. Fill a preallocated grid: each student row owns one `Option` per slot,
//!    and the first record for a (student, question) pair wins. Later
//!    duplicates are dropped and counted.
//!
//! Missing data is a state, not an error: absent blocks and blank sub-fields
//! surface as the sentinel defaults ("N/A", "Not Answered", 0) so every row
//! presents a uniform schema downstream. A record without a student
//! identifier, by contrast, fails the whole pivot.

use std::collections::{BTreeSet, HashMap};

use crate::models::record::FlatResponseRecord;
use crate::report::ReportError;

/// Fixed student-identity columns, in their declared output order.
pub const STUDENT_COLUMNS: [&str; 9] = [
    "TestDate",
    "SchoolId",
    "SchoolName",
    "StudentId",
    "FirstName",
    "LastName",
    "Gender",
    "Grade",
    "Region",
];

/// Per-question columns, prefixed with Q1_, Q2_, ... in the output.
pub const QUESTION_FIELDS: [&str; 7] = [
    "QuestionId",
    "Subject",
    "Level",
    "Type",
    "StudentAnswer",
    "CorrectAnswer",
    "Score",
];

pub const FIXED_COLUMN_COUNT: usize = STUDENT_COLUMNS.len();
pub const QUESTION_FIELD_COUNT: usize = QUESTION_FIELDS.len();

pub const NOT_ANSWERED: &str = "Not Answered";
pub const NOT_AVAILABLE: &str = "N/A";

/// One question's details on one student's row.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionBlock {
    pub question_id: i64,
    pub subject: String,
    pub level: String,
    pub question_type: String,
    pub student_answer: String,
    pub correct_answer: String,
    pub score: f64,
}

impl QuestionBlock {
    /// Builds a block from a record, substituting the sentinel defaults for
    /// any blank sub-field. The query normally applies these in SQL already;
    /// the pivot does not rely on that.
    fn from_record(rec: &FlatResponseRecord) -> Self {
        QuestionBlock {
            question_id: rec.question_id,
            subject: or_sentinel(&rec.subject, NOT_AVAILABLE),
            level: or_sentinel(&rec.level, NOT_AVAILABLE),
            question_type: or_sentinel(&rec.question_type, NOT_AVAILABLE),
            student_answer: or_sentinel(&rec.student_answer, NOT_ANSWERED),
            correct_answer: or_sentinel(&rec.correct_answer, NOT_AVAILABLE),
            score: rec.score,
        }
    }
}

fn or_sentinel(value: &str, sentinel: &str) -> String {
    if value.trim().is_empty() {
        sentinel.to_string()
    } else {
        value.to_string()
    }
}

/// One output row: the fixed identity fields plus one optional block per
/// question slot. `answers[slot - 1]` is `None` when the student has no
/// record for that slot; readers see the defaults through [`WideTable::cell`].
#[derive(Debug, Clone)]
pub struct StudentRow {
    /// Canonical `YYYY-MM-DD` rendering of the test date.
    pub test_date: String,
    pub school_id: i64,
    pub school_name: String,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub grade: Option<i64>,
    pub region: String,
    pub answers: Vec<Option<QuestionBlock>>,
}

impl StudentRow {
    fn from_identity(rec: &FlatResponseRecord) -> Self {
        StudentRow {
            test_date: rec.test_date.format("%Y-%m-%d").to_string(),
            school_id: rec.school_id,
            school_name: rec.school_name.clone(),
            student_id: rec.student_id.clone(),
            first_name: rec.first_name.clone(),
            last_name: rec.last_name.clone(),
            gender: rec.gender.clone(),
            grade: rec.grade,
            region: rec.region.clone(),
            answers: Vec::new(),
        }
    }
}

/// A single spreadsheet-ready value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

/// The pivoted result: rows in first-seen student order, question slots in
/// ascending question-id order.
#[derive(Debug, Clone, Default)]
pub struct WideTable {
    /// Distinct question ids sorted ascending; slot s holds
    /// `question_ids[s - 1]`.
    pub question_ids: Vec<i64>,
    pub rows: Vec<StudentRow>,
    /// How many later duplicates of a (student, question) pair were dropped.
    /// Surfaced so callers can log upstream data-quality issues.
    pub duplicates_dropped: usize,
}

impl WideTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total column count of the wide layout. Zero for an empty table.
    pub fn column_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            FIXED_COLUMN_COUNT + self.question_ids.len() * QUESTION_FIELD_COUNT
        }
    }

    /// Question count derived from the column layout, the same integer
    /// division the summary sheet reports.
    pub fn question_count(&self) -> usize {
        self.column_count().saturating_sub(FIXED_COLUMN_COUNT) / QUESTION_FIELD_COUNT
    }

    /// Column header names: the fixed student columns followed by
    /// `Q1_QuestionId .. QN_Score`.
    pub fn headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = STUDENT_COLUMNS.iter().map(|s| s.to_string()).collect();
        for slot in 1..=self.question_ids.len() {
            for field in QUESTION_FIELDS {
                headers.push(format!("Q{slot}_{field}"));
            }
        }
        headers
    }

    /// The value at (row, column) in the wide layout, with the default-fill
    /// policy applied for slots the student has no record for.
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        let r = &self.rows[row];
        if col < FIXED_COLUMN_COUNT {
            return match col {
                0 => Cell::Text(r.test_date.clone()),
                1 => Cell::Number(r.school_id as f64),
                2 => Cell::Text(r.school_name.clone()),
                3 => Cell::Text(r.student_id.clone()),
                4 => Cell::Text(r.first_name.clone()),
                5 => Cell::Text(r.last_name.clone()),
                6 => match &r.gender {
                    Some(g) => Cell::Text(g.clone()),
                    None => Cell::Empty,
                },
                7 => match r.grade {
                    Some(g) => Cell::Number(g as f64),
                    None => Cell::Empty,
                },
                _ => Cell::Text(r.region.clone()),
            };
        }
        let offset = col - FIXED_COLUMN_COUNT;
        let slot = offset / QUESTION_FIELD_COUNT;
        let field = offset % QUESTION_FIELD_COUNT;
        match r.answers.get(slot).and_then(|b| b.as_ref()) {
            Some(block) => match field {
                0 => Cell::Number(block.question_id as f64),
                1 => Cell::Text(block.subject.clone()),
                2 => Cell::Text(block.level.clone()),
                3 => Cell::Text(block.question_type.clone()),
                4 => Cell::Text(block.student_answer.clone()),
                5 => Cell::Text(block.correct_answer.clone()),
                _ => Cell::Number(block.score),
            },
            // No record for this slot: the whole block renders as defaults,
            // never as truly empty cells.
            None => match field {
                4 => Cell::Text(NOT_ANSWERED.to_string()),
                6 => Cell::Number(0.0),
                _ => Cell::Text(NOT_AVAILABLE.to_string()),
            },
        }
    }

    /// Number of distinct schools across all rows, for the summary sheet.
    pub fn distinct_school_count(&self) -> usize {
        let schools: BTreeSet<i64> = self.rows.iter().map(|r| r.school_id).collect();
        schools.len()
    }
}

/// Pivots flat response records into one row per student.
///
/// Empty input yields an empty table, which the renderer treats as its own
/// case rather than an error. A record with a blank `student_id` fails the
/// whole call; see [`ReportError::MissingStudentIdentity`].
pub fn pivot(records: &[FlatResponseRecord]) -> Result<WideTable, ReportError> {
    if records.is_empty() {
        return Ok(WideTable::default());
    }

    for (index, rec) in records.iter().enumerate() {
        if rec.student_id.trim().is_empty() {
            return Err(ReportError::MissingStudentIdentity { index });
        }
    }

    // Pass 1: identity set in first-seen order, plus the distinct question
    // ids. A BTreeSet keeps slot assignment independent of input order.
    let mut row_index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<StudentRow> = Vec::new();
    let mut distinct_questions: BTreeSet<i64> = BTreeSet::new();
    for rec in records {
        distinct_questions.insert(rec.question_id);
        if !row_index.contains_key(rec.student_id.as_str()) {
            row_index.insert(rec.student_id.as_str(), rows.len());
            rows.push(StudentRow::from_identity(rec));
        }
    }

    let question_ids: Vec<i64> = distinct_questions.into_iter().collect();
    let slot_of: HashMap<i64, usize> = question_ids
        .iter()
        .enumerate()
        .map(|(slot, &qid)| (qid, slot))
        .collect();

    for row in &mut rows {
        row.answers = vec![None; question_ids.len()];
    }

    // Pass 2: fill the grid. First record for a (student, question) pair
    // wins; later duplicates are counted, not kept.
    let mut duplicates_dropped = 0usize;
    for rec in records {
        let row = &mut rows[row_index[rec.student_id.as_str()]];
        let slot = slot_of[&rec.question_id];
        if row.answers[slot].is_none() {
            row.answers[slot] = Some(QuestionBlock::from_record(rec));
        } else {
            duplicates_dropped += 1;
        }
    }

    Ok(WideTable {
        question_ids,
        rows,
        duplicates_dropped,
    })
}

/// Record fixtures shared between the pivot and renderer tests.
#[cfg(test)]
pub(crate) mod tests_support {
    use crate::models::record::FlatResponseRecord;
    use chrono::NaiveDate;

    pub(crate) fn record(student_id: &str, question_id: i64) -> FlatResponseRecord {
        FlatResponseRecord {
            test_date: NaiveDate::from_ymd_opt(2025, 3, 14)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            school_id: 7,
            school_name: "Hillcrest Primary".into(),
            student_id: student_id.into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            gender: Some("F".into()),
            grade: Some(5),
            region: "Western".into(),
            question_id,
            question_type: "MCQ".into(),
            subject: "Math".into(),
            level: "Easy".into(),
            student_answer: "B".into(),
            correct_answer: "B".into(),
            score: 1.0,
        }
    }
}

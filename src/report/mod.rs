// src/report/mod.rs

pub mod excel;
pub mod pivot;

pub use excel::ExcelRenderer;
pub use pivot::{Cell, QuestionBlock, StudentRow, WideTable, pivot};

use std::fmt;

/// Errors raised while turning flat response records into a finished
/// workbook. Both variants are fatal for the invocation that hit them:
/// a malformed identity makes row grouping impossible, and a structural
/// workbook failure must never hand back a half-written buffer.
#[derive(Debug)]
pub enum ReportError {
    /// A record arrived without a student identifier. Identity is
    /// load-bearing for row grouping, so the record cannot be dropped
    /// silently the way absent question details are.
    MissingStudentIdentity { index: usize },

    /// The pivoted layout needs more columns than a worksheet can hold.
    TooManyColumns { columns: usize },

    /// The workbook writer itself failed.
    Xlsx(rust_xlsxwriter::XlsxError),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::MissingStudentIdentity { index } => {
                write!(f, "record {index} has no student identifier, cannot group rows")
            }
            ReportError::TooManyColumns { columns } => {
                write!(
                    f,
                    "report needs {columns} columns, exceeding the worksheet limit of {}",
                    excel::MAX_WORKSHEET_COLUMNS
                )
            }
            ReportError::Xlsx(err) => write!(f, "failed to build workbook: {err}"),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<rust_xlsxwriter::XlsxError> for ReportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ReportError::Xlsx(err)
    }
}

// src/report/excel.rs

//! Report Renderer: turns a [`WideTable`] into a finished XLSX workbook held
//! in memory. Two sheets for the normal case ("Student Responses" and
//! "Summary"), a minimal one-sheet notice when the table is empty. The
//! buffer is ready for transport; nothing is written to disk here.

use chrono::Local;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};

use crate::models::record::ContestInfo;
use crate::report::ReportError;
use crate::report::pivot::{Cell, FIXED_COLUMN_COUNT, STUDENT_COLUMNS, WideTable};

/// Hard XLSX grid limit (column XFD).
pub const MAX_WORKSHEET_COLUMNS: usize = 16_384;

const DATA_SHEET_NAME: &str = "Student Responses";
const SUMMARY_SHEET_NAME: &str = "Summary";

/// Data rows start below the three metadata lines and the header row.
const HEADER_ROW: u32 = 3;
const FIRST_DATA_ROW: u32 = 4;

/// Stateless renderer holding the reusable cell formats. Construct one per
/// report generation; it keeps nothing across calls.
pub struct ExcelRenderer {
    title_format: Format,
    header_format: Format,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ExcelRenderer {
    pub fn new() -> Self {
        let title_format = Format::new().set_bold().set_font_size(14);
        let header_format = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(0x4472C4))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap();
        ExcelRenderer {
            title_format,
            header_format,
        }
    }

    /// Renders the wide table into an in-memory XLSX buffer.
    ///
    /// An empty table is a distinct case, not an error: it produces a
    /// well-formed single-sheet workbook carrying the contest id and a
    /// "no data" notice. Any structural failure aborts the call without
    /// returning a partial buffer.
    pub fn render(
        &self,
        table: &WideTable,
        contest_id: i64,
        contest_info: Option<&ContestInfo>,
    ) -> Result<Vec<u8>, ReportError> {
        if table.is_empty() {
            return self.render_empty(contest_id);
        }
        if table.column_count() > MAX_WORKSHEET_COLUMNS {
            return Err(ReportError::TooManyColumns {
                columns: table.column_count(),
            });
        }

        let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let mut workbook = Workbook::new();

        self.write_data_sheet(&mut workbook, table, contest_id, &generated_at)?;
        self.write_summary_sheet(&mut workbook, table, contest_id, contest_info, &generated_at)?;

        Ok(workbook.save_to_buffer()?)
    }

    fn render_empty(&self, contest_id: i64) -> Result<Vec<u8>, ReportError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, format!("Contest ID: {contest_id}"))?;
        sheet.write_string(1, 0, "No data found for the specified filters.")?;
        Ok(workbook.save_to_buffer()?)
    }

    fn write_data_sheet(
        &self,
        workbook: &mut Workbook,
        table: &WideTable,
        contest_id: i64,
        generated_at: &str,
    ) -> Result<(), ReportError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(DATA_SHEET_NAME)?;

        // Metadata header lines
        sheet.write_string_with_format(
            0,
            0,
            format!("Contest ID: {contest_id}"),
            &self.title_format,
        )?;
        sheet.write_string(1, 0, format!("Generated: {generated_at}"))?;
        sheet.write_string(
            2,
            0,
            format!(
                "Students: {} | Questions: {}",
                table.rows.len(),
                table.question_count()
            ),
        )?;

        let headers = table.headers();
        for (col, name) in headers.iter().enumerate() {
            sheet.write_string_with_format(HEADER_ROW, col as u16, name, &self.header_format)?;
        }

        for row in 0..table.rows.len() {
            for col in 0..headers.len() {
                write_cell(
                    sheet,
                    FIRST_DATA_ROW + row as u32,
                    col as u16,
                    table.cell(row, col),
                )?;
            }
        }

        // Keep the header row and the fixed student columns visible while
        // scrolling through question blocks and student rows.
        sheet.set_freeze_panes(FIRST_DATA_ROW, FIXED_COLUMN_COUNT as u16)?;

        for (col, name) in headers.iter().enumerate() {
            let width = match name.as_str() {
                "TestDate" => 12.0,
                "SchoolName" => 25.0,
                n if STUDENT_COLUMNS.contains(&n) => 12.0,
                _ => 10.0,
            };
            sheet.set_column_width(col as u16, width)?;
        }

        Ok(())
    }

    fn write_summary_sheet(
        &self,
        workbook: &mut Workbook,
        table: &WideTable,
        contest_id: i64,
        contest_info: Option<&ContestInfo>,
        generated_at: &str,
    ) -> Result<(), ReportError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SUMMARY_SHEET_NAME)?;

        sheet.write_string_with_format(0, 0, "Metric", &self.header_format)?;
        sheet.write_string_with_format(0, 1, "Value", &self.header_format)?;

        let mut metrics: Vec<(&str, Cell)> = vec![
            ("Contest ID", Cell::Number(contest_id as f64)),
            ("Total Students", Cell::Number(table.rows.len() as f64)),
            (
                "Total Schools",
                Cell::Number(table.distinct_school_count() as f64),
            ),
            (
                "Total Questions",
                Cell::Number(table.question_count() as f64),
            ),
            ("Generated At", Cell::Text(generated_at.to_string())),
        ];

        if let Some(info) = contest_info {
            if let Some(start) = info.exam_start {
                metrics.push((
                    "Exam Start",
                    Cell::Text(start.format("%Y-%m-%d %H:%M:%S").to_string()),
                ));
            }
            if let Some(end) = info.exam_end {
                metrics.push((
                    "Exam End",
                    Cell::Text(end.format("%Y-%m-%d %H:%M:%S").to_string()),
                ));
            }
        }

        for (i, (name, value)) in metrics.into_iter().enumerate() {
            let row = 1 + i as u32;
            sheet.write_string(row, 0, name)?;
            write_cell(sheet, row, 1, value)?;
        }

        sheet.set_column_width(0, 16.0)?;
        sheet.set_column_width(1, 22.0)?;

        Ok(())
    }
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: Cell) -> Result<(), ReportError> {
    match value {
        Cell::Text(s) => {
            sheet.write_string(row, col, s)?;
        }
        Cell::Number(n) => {
            sheet.write_number(row, col, n)?;
        }
        Cell::Empty => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::pivot::pivot;
    use calamine::{Data, Reader, Xlsx};
    use std::io::Cursor;

    fn open(buffer: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
        Xlsx::new(Cursor::new(buffer)).expect("buffer is a valid xlsx archive")
    }

    fn text(range: &calamine::Range<Data>, row: u32, col: u32) -> String {
        match range.get_value((row, col)) {
            Some(Data::String(s)) => s.clone(),
            other => panic!("expected text at ({row},{col}), got {other:?}"),
        }
    }

    #[test]
    fn empty_table_renders_minimal_notice() {
        let renderer = ExcelRenderer::new();
        let buffer = renderer.render(&WideTable::default(), 42, None).unwrap();

        let mut workbook = open(buffer);
        let name = workbook.sheet_names()[0].clone();
        let range = workbook.worksheet_range(&name).unwrap();
        assert_eq!(text(&range, 0, 0), "Contest ID: 42");
        assert_eq!(text(&range, 1, 0), "No data found for the specified filters.");
    }

    #[test]
    fn data_sheet_and_summary_sheet_are_present() {
        let records = vec![
            crate::report::pivot::tests_support::record("alice", 10),
            crate::report::pivot::tests_support::record("bob", 20),
        ];
        let table = pivot(&records).unwrap();
        let renderer = ExcelRenderer::new();
        let buffer = renderer.render(&table, 7, None).unwrap();

        let workbook = open(buffer);
        let names = workbook.sheet_names();
        assert!(names.contains(&DATA_SHEET_NAME.to_string()));
        assert!(names.contains(&SUMMARY_SHEET_NAME.to_string()));
    }

    #[test]
    fn too_many_columns_is_a_structural_error() {
        // 2400 question blocks of 7 columns blow past the XFD limit.
        let records: Vec<_> = (0..2400)
            .map(|q| crate::report::pivot::tests_support::record("alice", q))
            .collect();
        let table = pivot(&records).unwrap();
        let renderer = ExcelRenderer::new();
        let err = renderer.render(&table, 7, None).unwrap_err();
        assert!(matches!(err, ReportError::TooManyColumns { .. }));
    }
}

// tests/report_flow.rs
//
// End-to-end checks for the report core: flat records in, finished workbook
// out, verified cell by cell through calamine. No database or server is
// involved; the pivot and render steps are pure.

use calamine::{Data, Range, Reader, Xlsx};
use chrono::NaiveDate;
use std::io::Cursor;

use contest_reports::models::record::{ContestInfo, FlatResponseRecord};
use contest_reports::report::{ExcelRenderer, pivot};

fn record(student_id: &str, last_name: &str, question_id: i64) -> FlatResponseRecord {
    FlatResponseRecord {
        test_date: NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(10, 15, 0)
            .unwrap(),
        school_id: 3,
        school_name: "Lakeside College".into(),
        student_id: student_id.into(),
        first_name: "Jo".into(),
        last_name: last_name.into(),
        gender: Some("M".into()),
        grade: Some(6),
        region: "Northern".into(),
        question_id,
        question_type: "MCQ".into(),
        subject: "Science".into(),
        level: "Medium".into(),
        student_answer: "C".into(),
        correct_answer: "C".into(),
        score: 2.0,
    }
}

fn open(buffer: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
    Xlsx::new(Cursor::new(buffer)).expect("renderer produced a valid xlsx archive")
}

fn text(range: &Range<Data>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        Some(Data::String(s)) => s.clone(),
        other => panic!("expected text at ({row},{col}), got {other:?}"),
    }
}

fn number(range: &Range<Data>, row: u32, col: u32) -> f64 {
    match range.get_value((row, col)) {
        Some(Data::Float(f)) => *f,
        Some(Data::Int(i)) => *i as f64,
        other => panic!("expected number at ({row},{col}), got {other:?}"),
    }
}

#[test]
fn full_report_round_trip() {
    // Alice answers questions 10 and 50, Bob only 30. Ascending question-id
    // order makes the slots 10 -> 1, 30 -> 2, 50 -> 3 regardless of the
    // order records arrive in.
    let records = vec![
        record("alice01", "Anders", 50),
        record("bob02", "Baker", 30),
        record("alice01", "Anders", 10),
    ];
    let table = pivot(&records).unwrap();
    let info = ContestInfo {
        contest_id: 314,
        exam_start: NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0),
        exam_end: NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0),
    };

    let buffer = ExcelRenderer::new().render(&table, 314, Some(&info)).unwrap();
    let mut workbook = open(buffer);

    let data = workbook.worksheet_range("Student Responses").unwrap();

    // Metadata lines
    assert_eq!(text(&data, 0, 0), "Contest ID: 314");
    assert!(text(&data, 1, 0).starts_with("Generated: "));
    assert_eq!(text(&data, 2, 0), "Students: 2 | Questions: 3");

    // Header row: fixed student columns, then Q1_..Q3_ blocks of 7
    assert_eq!(text(&data, 3, 0), "TestDate");
    assert_eq!(text(&data, 3, 2), "SchoolName");
    assert_eq!(text(&data, 3, 8), "Region");
    assert_eq!(text(&data, 3, 9), "Q1_QuestionId");
    assert_eq!(text(&data, 3, 16), "Q2_QuestionId");
    assert_eq!(text(&data, 3, 29), "Q3_Score");

    // Alice's row: answered slots 1 and 3, slot 2 fully defaulted
    assert_eq!(text(&data, 4, 0), "2025-06-02");
    assert_eq!(text(&data, 4, 3), "alice01");
    assert_eq!(number(&data, 4, 9), 10.0);
    assert_eq!(text(&data, 4, 16), "N/A");
    assert_eq!(text(&data, 4, 20), "Not Answered");
    assert_eq!(number(&data, 4, 22), 0.0);
    assert_eq!(number(&data, 4, 23), 50.0);
    assert_eq!(number(&data, 4, 29), 2.0);

    // Bob's row: only slot 2 answered
    assert_eq!(text(&data, 5, 3), "bob02");
    assert_eq!(text(&data, 5, 9), "N/A");
    assert_eq!(number(&data, 5, 16), 30.0);
    assert_eq!(text(&data, 5, 27), "Not Answered");
    assert_eq!(number(&data, 5, 29), 0.0);

    // Summary sheet
    let summary = workbook.worksheet_range("Summary").unwrap();
    assert_eq!(text(&summary, 0, 0), "Metric");
    assert_eq!(text(&summary, 1, 0), "Contest ID");
    assert_eq!(number(&summary, 1, 1), 314.0);
    assert_eq!(text(&summary, 2, 0), "Total Students");
    assert_eq!(number(&summary, 2, 1), 2.0);
    assert_eq!(text(&summary, 3, 0), "Total Schools");
    assert_eq!(number(&summary, 3, 1), 1.0);
    assert_eq!(text(&summary, 4, 0), "Total Questions");
    assert_eq!(number(&summary, 4, 1), 3.0);
    assert_eq!(text(&summary, 5, 0), "Generated At");
    assert_eq!(text(&summary, 6, 0), "Exam Start");
    assert_eq!(text(&summary, 6, 1), "2025-06-02 09:00:00");
    assert_eq!(text(&summary, 7, 0), "Exam End");
}

#[test]
fn empty_result_set_still_yields_a_workbook() {
    let table = pivot(&[]).unwrap();
    assert!(table.is_empty());

    let buffer = ExcelRenderer::new().render(&table, 99, None).unwrap();
    let mut workbook = open(buffer);

    let name = workbook.sheet_names()[0].clone();
    let sheet = workbook.worksheet_range(&name).unwrap();
    assert_eq!(text(&sheet, 0, 0), "Contest ID: 99");
    assert_eq!(text(&sheet, 1, 0), "No data found for the specified filters.");
}

#[test]
fn blank_answer_surfaces_as_not_answered_in_the_workbook() {
    let mut rec = record("cara03", "Chen", 7);
    rec.student_answer = "".into();
    let table = pivot(&[rec]).unwrap();

    let buffer = ExcelRenderer::new().render(&table, 5, None).unwrap();
    let mut workbook = open(buffer);
    let data = workbook.worksheet_range("Student Responses").unwrap();

    // Q1_StudentAnswer sits at column 9 + 4.
    assert_eq!(text(&data, 3, 13), "Q1_StudentAnswer");
    assert_eq!(text(&data, 4, 13), "Not Answered");
}

#[test]
fn duplicate_records_keep_first_score_in_the_workbook() {
    let first = record("dan04", "Diaz", 11);
    let mut second = record("dan04", "Diaz", 11);
    second.score = 9.0;
    let table = pivot(&[first, second]).unwrap();
    assert_eq!(table.duplicates_dropped, 1);

    let buffer = ExcelRenderer::new().render(&table, 6, None).unwrap();
    let mut workbook = open(buffer);
    let data = workbook.worksheet_range("Student Responses").unwrap();

    // Q1_Score sits at column 9 + 6.
    assert_eq!(number(&data, 4, 15), 2.0);
}

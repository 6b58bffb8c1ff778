mod common;

use common::{Call, RecordingEngine};
use pretty_assertions::assert_eq;
use sheetcraft::{
    BoxError, CellAddress, CellValue, Error, ReportAssembler, RowSet, StyleConfig,
    WorkbookBuilder,
};
use sheetcraft_core::{MAX_COLS, MAX_ROWS};
use std::error::Error as _;

fn region_rows(region: &'static str, months: u32) -> impl Fn() -> Result<RowSet, BoxError> {
    move || {
        let mut set = RowSet::new().with_header(["Region", "Month", "Revenue"]);
        for month in 1..=months {
            set.push_row([
                CellValue::from(region),
                CellValue::from(month),
                CellValue::from(f64::from(month) * 100.0),
            ]);
        }
        Ok(set)
    }
}

#[test]
fn test_rows_are_applied_in_job_order() {
    let mut wb = WorkbookBuilder::with_engine(RecordingEngine::new());
    wb.add_sheet("North").unwrap().row().unwrap().cell("existing").unwrap();

    ReportAssembler::new()
        .header_style(StyleConfig::new().bold(true))
        .job("North", region_rows("North", 2))
        .job("South", region_rows("South", 3))
        .assemble(&mut wb)
        .unwrap();

    assert_eq!(wb.sheet_names(), vec!["North", "South"]);
    assert_eq!(wb.sheet("North").unwrap().last_row(), 4);
    assert_eq!(wb.sheet("South").unwrap().last_row(), 4);

    let built = wb.build().unwrap();
    let engine = built.engine();
    assert_eq!(engine.registrations(), 1);
    assert_eq!(
        engine.values.get(&("North".to_string(), CellAddress::new(1, 0))),
        Some(&CellValue::from("Region"))
    );
    assert_eq!(
        engine.values.get(&("South".to_string(), CellAddress::new(3, 2))),
        Some(&CellValue::Number(300.0))
    );
    // header cells of both sheets share the one bold style
    assert_eq!(engine.styles_applied().len(), 6);
}

#[test]
fn test_failed_job_leaves_workbook_untouched() {
    let mut wb = WorkbookBuilder::with_engine(RecordingEngine::new());
    wb.add_sheet("North").unwrap();

    let err = ReportAssembler::new()
        .job("North", region_rows("North", 2))
        .job("South", || Err("warehouse offline".into()))
        .job("East", region_rows("East", 1))
        .assemble(&mut wb)
        .unwrap_err();

    match &err {
        Error::Worker { sheet, source } => {
            assert_eq!(sheet, "South");
            assert_eq!(source.to_string(), "warehouse offline");
            assert_eq!(err.source().unwrap().to_string(), "warehouse offline");
        }
        other => panic!("expected worker error, got {:?}", other),
    }
    assert_eq!(wb.sheet_names(), vec!["North"]);
    assert_eq!(wb.sheet("North").unwrap().last_row(), 0);
    assert_eq!(wb.engine().calls, vec![Call::CreateSheet("North".into())]);
}

#[test]
fn test_invalid_sheet_name_fails_before_jobs_run() {
    let mut wb = WorkbookBuilder::with_engine(RecordingEngine::new());
    let err = ReportAssembler::new()
        .job("Q1/Q2", region_rows("North", 1))
        .assemble(&mut wb)
        .unwrap_err();
    assert!(matches!(err, Error::Worker { ref sheet, .. } if sheet == "Q1/Q2"));
    assert!(wb.sheet_names().is_empty());
}

#[test]
fn test_too_wide_row_leaves_workbook_untouched() {
    let mut wb = WorkbookBuilder::with_engine(RecordingEngine::new());
    let err = ReportAssembler::new()
        .job("A", || {
            let mut set = RowSet::new();
            set.push_row([1.0, 2.0]);
            Ok(set)
        })
        .job("B", || {
            let mut set = RowSet::new();
            set.push_row(vec![0.0; usize::from(MAX_COLS) + 1]);
            Ok(set)
        })
        .assemble(&mut wb)
        .unwrap_err();

    match &err {
        Error::Worker { sheet, source } => {
            assert_eq!(sheet, "B");
            assert!(matches!(
                source.downcast_ref::<sheetcraft_core::Error>(),
                Some(sheetcraft_core::Error::ColumnOutOfBounds(..))
            ));
        }
        other => panic!("expected worker error, got {:?}", other),
    }
    assert!(wb.sheet_names().is_empty());
    assert!(wb.engine().calls.is_empty());
}

#[test]
fn test_rows_past_the_last_sheet_row_leave_workbook_untouched() {
    let mut wb = WorkbookBuilder::with_engine(RecordingEngine::new());
    wb.add_sheet("North")
        .unwrap()
        .row_at(MAX_ROWS - 1)
        .unwrap()
        .cell("almost full")
        .unwrap();

    let err = ReportAssembler::new()
        .job("South", region_rows("South", 1))
        .job("north", region_rows("North", 1))
        .assemble(&mut wb)
        .unwrap_err();

    assert!(matches!(err, Error::Worker { ref sheet, .. } if sheet == "north"));
    assert_eq!(wb.sheet_names(), vec!["North"]);
    assert_eq!(wb.sheet("North").unwrap().last_row(), MAX_ROWS - 1);
}

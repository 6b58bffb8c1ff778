mod common;

use common::{Call, RecordingEngine};
use pretty_assertions::assert_eq;
use sheetcraft::{
    Aggregation, CellAddress, CellRange, CellValue, ChartBuilder, ChartKind,
    DataValidationBuilder, Error, PivotTableBuilder, SpreadsheetEngine, StyleConfig, StyleId,
    StyleRegistry, WorkbookBuilder,
};
use sheetcraft_core::MAX_ROWS;

fn addr(s: &str) -> CellAddress {
    CellAddress::parse(s).unwrap()
}

fn recording() -> WorkbookBuilder<RecordingEngine> {
    WorkbookBuilder::with_engine(RecordingEngine::new())
}

#[test]
fn test_duplicate_sheet_leaves_workbook_unchanged() {
    let mut wb = recording();
    wb.add_sheet("Data").unwrap();
    assert!(matches!(wb.add_sheet("Data"), Err(Error::DuplicateSheet(_))));
    assert!(matches!(wb.add_sheet("DATA"), Err(Error::DuplicateSheet(_))));
    assert_eq!(wb.sheet_names(), vec!["Data"]);
    assert_eq!(wb.engine().sheets, vec!["Data".to_string()]);
}

#[test]
fn test_invalid_sheet_names() {
    let mut wb = recording();
    let long = "x".repeat(32);
    for name in ["", "a/b", "what?", long.as_str()] {
        assert!(
            matches!(wb.add_sheet(name), Err(Error::InvalidSheetName(_))),
            "accepted {:?}",
            name
        );
    }
    assert!(wb.sheet_names().is_empty());
}

#[test]
fn test_unknown_sheets() {
    let mut wb = recording();
    wb.add_sheet("Data").unwrap();
    assert!(matches!(
        wb.set_active_sheet("Summary"),
        Err(Error::UnknownSheet(name)) if name == "Summary"
    ));
    assert!(matches!(wb.sheet("Summary"), Err(Error::UnknownSheet(_))));
    assert!(wb.sheet("data").is_ok());
}

#[test]
fn test_inverted_merges_fail_immediately() {
    let mut wb = recording();
    let mut sheet = wb.add_sheet("Data").unwrap();
    assert!(matches!(sheet.merge("C1:A1"), Err(Error::InvalidRange(_))));
    assert!(matches!(sheet.merge("A3:A1"), Err(Error::InvalidRange(_))));

    sheet.row().unwrap();
    let mut row = sheet.row().unwrap();
    let cell = row.cell_at("B", "x").unwrap();
    assert!(matches!(cell.merge_to("A2"), Err(Error::InvalidRange(_))));
}

#[test]
fn test_overlapping_merges_fail_at_build() {
    let mut wb = recording();
    wb.add_sheet("Data")
        .unwrap()
        .merge("A1:B2")
        .unwrap()
        .merge("B2:C3")
        .unwrap()
        .row().unwrap()
        .cell("title")
        .unwrap();

    let err = wb.build().unwrap_err();
    assert!(matches!(err, Error::OverlappingMerge { ref sheet, .. } if sheet == "Data"));
}

#[test]
fn test_cursors_only_move_forward() {
    let mut wb = recording();
    let mut sheet = wb.add_sheet("Data").unwrap();
    sheet.row().unwrap().cell("first").unwrap();
    assert_eq!(sheet.last_row(), 1);

    sheet.row_at(5).unwrap().cell("fifth").unwrap();
    assert_eq!(sheet.last_row(), 5);
    assert!(matches!(sheet.row_at(5), Err(Error::CursorRewind { .. })));
    assert!(matches!(sheet.row_at(3), Err(Error::CursorRewind { .. })));
    assert_eq!(sheet.row().unwrap().number(), 6);

    let mut row = sheet.row().unwrap();
    row.cell_at("C", "c").unwrap();
    assert!(matches!(row.cell_at("B", "b"), Err(Error::CursorRewind { .. })));
    assert!(matches!(row.cell_at("C", "c"), Err(Error::CursorRewind { .. })));
    assert_eq!(row.cell("d").unwrap().address(), addr("D7"));

    let built = wb.build().unwrap();
    let values: Vec<(CellAddress, CellValue)> = built
        .engine()
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::SetValue(_, a, v) => Some((*a, v.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        values,
        vec![
            (addr("A1"), CellValue::from("first")),
            (addr("A5"), CellValue::from("fifth")),
            (addr("C7"), CellValue::from("c")),
            (addr("D7"), CellValue::from("d")),
        ]
    );
}

#[test]
fn test_equal_styles_register_once() {
    let mut wb = recording();
    let header = StyleConfig::new().bold(true).font_size(12.0);
    wb.add_sheet("Data")
        .unwrap()
        .row().unwrap()
        .cell("Region")
        .unwrap()
        .style(&header)
        .done()
        .cell("Revenue")
        .unwrap()
        .style(&StyleConfig::new().bold(true).font_size(12.0))
        .done();

    assert_eq!(wb.registry().len(), 1);
    assert_eq!(wb.registry().registered_count(), 0);

    let built = wb.build().unwrap();
    assert_eq!(built.engine().registrations(), 1);
    assert_eq!(
        built.engine().styles_applied(),
        vec![(addr("A1"), StyleId(1)), (addr("B1"), StyleId(1))]
    );
    let flyweight = built.registry().iter().next().unwrap();
    assert_eq!(flyweight.id(), Some(StyleId(1)));
    assert!(flyweight == header);
}

#[test]
fn test_rejected_style_is_a_registration_error() {
    let mut engine = RecordingEngine::new();
    engine.reject_styles = true;
    let mut wb = WorkbookBuilder::with_engine(engine);
    wb.add_sheet("Data")
        .unwrap()
        .row().unwrap()
        .cell(1.0)
        .unwrap()
        .style(&StyleConfig::new().italic(true));

    match wb.build() {
        Err(Error::Registration { style, .. }) => assert!(style.contains("italic")),
        other => panic!("expected registration error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_layout_is_forwarded_immediately() {
    let mut wb = recording();
    {
        let mut sheet = wb.add_sheet("Data").unwrap();
        sheet.column_width("B", 20.0).unwrap();
        sheet.freeze_panes("A2").unwrap();
        sheet.row().unwrap().height(30.0).unwrap();
    }
    assert_eq!(
        wb.engine().calls,
        vec![
            Call::CreateSheet("Data".into()),
            Call::ColumnWidth("Data".into(), 1, 20.0),
            Call::Freeze("Data".into(), addr("A2")),
            Call::RowHeight("Data".into(), 0, 30.0),
        ]
    );
}

#[test]
fn test_build_order() {
    let mut wb = recording();
    wb.add_sheet("Data")
        .unwrap()
        .merge("A1:B1")
        .unwrap()
        .chart(
            ChartBuilder::new(ChartKind::Column)
                .series_with_categories("Revenue", "Data!A3:A4", "Data!B3:B4")
                .anchor("D2"),
        )
        .unwrap()
        .data_validation(DataValidationBuilder::list(["North", "South"]).range("A3:A4"))
        .unwrap()
        .row().unwrap()
        .cell("Sales")
        .unwrap()
        .done()
        .done()
        .row().unwrap()
        .cell("Region")
        .unwrap()
        .done()
        .cell("Revenue")
        .unwrap();
    wb.add_sheet("Summary")
        .unwrap()
        .pivot_table(
            PivotTableBuilder::new("ByRegion")
                .source("Data!A2:B4")
                .target("A3")
                .add_row_field("Region")
                .add_value_field("Revenue", Aggregation::Sum),
        )
        .unwrap();
    wb.set_active_sheet("summary").unwrap();

    let built = wb.build().unwrap();
    let kinds: Vec<&str> = built
        .engine()
        .calls
        .iter()
        .map(|c| match c {
            Call::CreateSheet(_) => "sheet",
            Call::SetValue(..) => "value",
            Call::Merge(..) => "merge",
            Call::Validation(..) => "validation",
            Call::Chart(..) => "chart",
            Call::Pivot(_) => "pivot",
            Call::ActiveSheet(_) => "active",
            _ => "other",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "sheet", "sheet", "value", "value", "value", "merge", "validation", "chart", "pivot",
            "active"
        ]
    );
    assert!(built.engine().calls.contains(&Call::ActiveSheet(1)));
    assert!(built.engine().calls.contains(&Call::Merge(
        "Data".into(),
        CellRange::parse("A1:B1").unwrap()
    )));
}

#[test]
fn test_chart_on_unknown_sheet_fails_at_build() {
    let mut wb = recording();
    wb.add_sheet("Summary")
        .unwrap()
        .chart(ChartBuilder::new(ChartKind::Line).series("Revenue", "Missing!B2:B5"))
        .unwrap();
    assert!(matches!(wb.build(), Err(Error::UnknownSheet(name)) if name == "Missing"));
}

#[test]
fn test_cell_validation_covers_the_cell() {
    let mut wb = recording();
    wb.add_sheet("Data")
        .unwrap()
        .row().unwrap()
        .cell("North")
        .unwrap()
        .validate(DataValidationBuilder::list(["North", "South"]))
        .unwrap();

    let built = wb.build().unwrap();
    let rule = built
        .engine()
        .calls
        .iter()
        .find_map(|c| match c {
            Call::Validation(_, rule) => Some(rule.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(rule.sqref(), "A1");
}

#[test]
fn test_row_past_the_last_sheet_row_fails_fast() {
    let mut wb = recording();
    let mut sheet = wb.add_sheet("Data").unwrap();
    assert_eq!(sheet.row_at(MAX_ROWS).unwrap().number(), MAX_ROWS);
    assert!(matches!(
        sheet.row(),
        Err(Error::Core(sheetcraft_core::Error::RowOutOfBounds(..)))
    ));
    assert_eq!(sheet.last_row(), MAX_ROWS);
}

#[test]
fn test_style_on_missing_sheet_is_an_apply_error() {
    let mut engine = RecordingEngine::new();
    engine.create_sheet("Data").unwrap();
    let mut registry = StyleRegistry::new();
    let handle = registry.resolve(&StyleConfig::new().bold(true));

    let err = registry
        .apply(handle, &mut engine, "Archive", addr("B2"))
        .unwrap_err();
    match err {
        Error::Apply { sheet, cell, .. } => {
            assert_eq!(sheet, "Archive");
            assert_eq!(cell, addr("B2"));
        }
        other => panic!("expected apply error, got {:?}", other),
    }

    // registration happened before the failed application and is kept
    assert_eq!(registry.get(handle).unwrap().id(), Some(StyleId(1)));
    assert_eq!(registry.registered_count(), 1);
    assert_eq!(engine.registrations(), 1);

    let id = registry
        .apply(handle, &mut engine, "Data", addr("B2"))
        .unwrap();
    assert_eq!(id, StyleId(1));
    assert_eq!(engine.registrations(), 1);
}

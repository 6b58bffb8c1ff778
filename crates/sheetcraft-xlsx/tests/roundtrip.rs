//! Save workbooks to disk and read them back

use std::fs::File;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sheetcraft_core::{
    Aggregation, CellAddress, CellRange, CellValue, ChartAnchor, ChartKind, ChartSeries,
    ChartSpec, Color, NumberFormat, PivotTableSpec, PivotValueField, SheetRange,
    SpreadsheetEngine, StyleConfig,
};
use sheetcraft_xlsx::{XlsxEngine, XlsxReader};

fn addr(s: &str) -> CellAddress {
    CellAddress::parse(s).unwrap()
}

fn sales_engine() -> XlsxEngine {
    let mut engine = XlsxEngine::new();
    engine.create_sheet("Data").unwrap();
    engine.create_sheet("Summary").unwrap();

    let rows = [
        ("Region", "Month", "Revenue"),
        ("North", "Jan", "1200"),
        ("South", "Jan", "900"),
        ("North", "Feb", "1350"),
    ];
    for (i, (region, month, revenue)) in rows.iter().enumerate() {
        let row = i as u32;
        engine
            .set_cell_value("Data", CellAddress::new(row, 0), CellValue::from(*region))
            .unwrap();
        engine
            .set_cell_value("Data", CellAddress::new(row, 1), CellValue::from(*month))
            .unwrap();
        let value = match revenue.parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::from(*revenue),
        };
        engine
            .set_cell_value("Data", CellAddress::new(row, 2), value)
            .unwrap();
    }
    engine
}

#[test]
fn test_roundtrip_values_and_styles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xlsx");

    let mut engine = XlsxEngine::new();
    engine.create_sheet("Report").unwrap();
    engine
        .set_cell_value("Report", addr("A1"), CellValue::from("Revenue"))
        .unwrap();
    engine
        .set_cell_value("Report", addr("B1"), CellValue::Number(1_200_000.0))
        .unwrap();
    engine
        .set_cell_value("Report", addr("C1"), CellValue::Boolean(true))
        .unwrap();
    engine
        .set_cell_value("Report", addr("D1"), CellValue::formula("SUM(B1:B1)"))
        .unwrap();
    engine
        .set_cell_value("Report", addr("E1"), CellValue::from("  padded  "))
        .unwrap();

    let money = StyleConfig::new()
        .bold(true)
        .fill_color(Color::from_hex("#FFEEAA").unwrap())
        .number_format(NumberFormat::currency());
    let id = engine.register_style(&money).unwrap();
    engine.set_cell_style("Report", addr("B1"), id).unwrap();

    engine.save_as(&path).unwrap();

    let reopened = XlsxReader::read_file(&path).unwrap();
    let sheet = reopened.worksheet("Report").unwrap();
    assert_eq!(sheet.value(addr("A1")), CellValue::from("Revenue"));
    assert_eq!(sheet.value(addr("B1")), CellValue::Number(1_200_000.0));
    assert_eq!(sheet.value(addr("C1")), CellValue::Boolean(true));
    assert_eq!(sheet.value(addr("D1")), CellValue::formula("SUM(B1:B1)"));
    assert_eq!(sheet.value(addr("E1")), CellValue::from("  padded  "));

    let style_id = sheet.style_id(addr("B1")).unwrap();
    let style = reopened.style(style_id).unwrap();
    assert!(style.font().bold);
    assert_eq!(style.format(), &NumberFormat::currency());
    assert_eq!(style.fill(), money.fill());
    assert_eq!(sheet.style_id(addr("A1")), None);
}

#[test]
fn test_roundtrip_dates() {
    let mut engine = XlsxEngine::new();
    engine.create_sheet("Dates").unwrap();
    let when = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    engine
        .set_cell_value("Dates", addr("A1"), CellValue::from(when))
        .unwrap();
    let date_style = engine
        .register_style(&StyleConfig::new().number_format(NumberFormat::date()))
        .unwrap();
    engine.set_cell_style("Dates", addr("A1"), date_style).unwrap();

    let bytes = engine.to_bytes().unwrap();
    let reopened = XlsxReader::read(std::io::Cursor::new(bytes)).unwrap();
    let sheet = reopened.worksheet("Dates").unwrap();
    assert_eq!(
        sheet.value(addr("A1")),
        CellValue::DateTime(when.and_hms_opt(0, 0, 0).unwrap())
    );
}

#[test]
fn test_roundtrip_layout() {
    let mut engine = sales_engine();
    engine
        .merge_cells("Summary", CellRange::parse("A1:C1").unwrap())
        .unwrap();
    engine.set_column_width("Data", 0, 18.5).unwrap();
    engine.set_column_width("Data", 2, 12.0).unwrap();
    engine.set_row_height("Data", 0, 24.0).unwrap();
    engine.freeze_panes("Data", addr("A2")).unwrap();
    engine.set_active_sheet(1).unwrap();

    let bytes = engine.to_bytes().unwrap();
    let reopened = XlsxReader::read(std::io::Cursor::new(bytes)).unwrap();

    assert_eq!(reopened.sheet_names(), vec!["Data", "Summary"]);
    assert_eq!(reopened.active_sheet(), 1);

    let data = reopened.worksheet("Data").unwrap();
    assert_eq!(data.column_width(0), Some(18.5));
    assert_eq!(data.column_width(1), None);
    assert_eq!(data.column_width(2), Some(12.0));
    assert_eq!(data.row_height(0), Some(24.0));
    assert_eq!(data.freeze_panes(), Some(addr("A2")));
    assert_eq!(data.value(addr("C4")), CellValue::Number(1350.0));

    let summary = reopened.worksheet("Summary").unwrap();
    assert_eq!(
        summary.merged_ranges(),
        &[CellRange::parse("A1:C1").unwrap()]
    );
}

#[test]
fn test_package_contains_chart_and_pivot_parts() {
    let mut engine = sales_engine();
    let chart = ChartSpec {
        kind: ChartKind::Column,
        title: Some("Revenue".into()),
        series: vec![ChartSeries {
            name: "Revenue".into(),
            categories: Some(SheetRange::parse("Data!A2:A4").unwrap()),
            values: SheetRange::parse("Data!C2:C4").unwrap(),
        }],
        anchor: ChartAnchor::at(addr("E2")),
        ..Default::default()
    };
    engine.add_chart("Summary", &chart).unwrap();

    let pivot = PivotTableSpec {
        name: "RevenueByRegion".into(),
        source: SheetRange::parse("Data!A1:C4").unwrap(),
        target_sheet: "Summary".into(),
        target_cell: addr("A3"),
        row_fields: vec!["Region".into()],
        column_fields: vec![],
        value_fields: vec![PivotValueField::new("Revenue", Aggregation::Sum)],
    };
    engine.add_pivot_table(&pivot).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.xlsx");
    engine.save_as(&path).unwrap();

    let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
    for part in [
        "[Content_Types].xml",
        "xl/workbook.xml",
        "xl/styles.xml",
        "xl/worksheets/sheet1.xml",
        "xl/worksheets/sheet2.xml",
        "xl/drawings/drawing1.xml",
        "xl/charts/chart1.xml",
        "xl/pivotTables/pivotTable1.xml",
        "xl/pivotCache/pivotCacheDefinition1.xml",
    ] {
        assert!(archive.by_name(part).is_ok(), "missing part {}", part);
    }

    // Charts and pivots are not read back, but the data still is
    let reopened = XlsxReader::read_file(&path).unwrap();
    let data = reopened.worksheet("Data").unwrap();
    assert_eq!(data.value(addr("A2")), CellValue::from("North"));
    assert_eq!(reopened.pivot_tables().len(), 0);
}

#[test]
fn test_reject_non_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not-a-workbook.xlsx");
    std::fs::write(&path, b"plain text").unwrap();
    assert!(XlsxReader::read_file(&path).is_err());
}

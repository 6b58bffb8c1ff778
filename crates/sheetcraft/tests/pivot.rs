mod common;

use common::{Call, RecordingEngine};
use pretty_assertions::assert_eq;
use sheetcraft::{
    Aggregation, Error, PivotTableBuilder, SpreadsheetEngine, WorkbookBuilder, XlsxEngine,
};

fn with_sales_data<E: SpreadsheetEngine>(wb: &mut WorkbookBuilder<E>) {
    let mut data = wb.add_sheet("Data").unwrap();
    data.row().unwrap().cells(["Region", "Month", "Revenue"], None).unwrap();
    data.row().unwrap().cells(["North", "Jan"], None).unwrap().cell(1200.0).unwrap();
    data.row().unwrap().cells(["South", "Jan"], None).unwrap().cell(900.0).unwrap();
    wb.add_sheet("Summary").unwrap();
}

fn revenue_by(field: &str) -> PivotTableBuilder {
    PivotTableBuilder::new("RevenuePivot")
        .source("Data!A1:C3")
        .target("Summary!A3")
        .add_row_field(field)
        .add_value_field("Revenue", Aggregation::Sum)
}

#[test]
fn test_missing_field_is_rejected() {
    let mut wb = WorkbookBuilder::with_engine(RecordingEngine::new());
    with_sales_data(&mut wb);
    wb.add_pivot_table(revenue_by("Country")).unwrap();

    match wb.build() {
        Err(Error::InvalidField {
            field,
            source_range,
        }) => {
            assert_eq!(field, "Country");
            assert_eq!(source_range, "Data!A1:C3");
        }
        other => panic!("expected invalid field, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_opaque_engine_defers_field_checks() {
    let mut wb = WorkbookBuilder::with_engine(RecordingEngine::opaque());
    with_sales_data(&mut wb);
    wb.add_pivot_table(revenue_by("Country")).unwrap();

    let built = wb.build().unwrap();
    let pivots: Vec<&Call> = built
        .engine()
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Pivot(_)))
        .collect();
    assert_eq!(pivots.len(), 1);
}

#[test]
fn test_field_names_match_ignoring_case() {
    let mut wb = WorkbookBuilder::new();
    with_sales_data(&mut wb);
    wb.add_pivot_table(revenue_by("region")).unwrap();
    let built = wb.build().unwrap();
    assert_eq!(built.engine().pivot_tables().len(), 1);
    assert_eq!(
        built.engine().pivot_tables()[0].headers,
        vec!["Region", "Month", "Revenue"]
    );

    let mut wb = WorkbookBuilder::new();
    with_sales_data(&mut wb);
    wb.add_pivot_table(
        PivotTableBuilder::new("ByMonth")
            .source("Data!A1:C3")
            .target("Summary!A3")
            .add_column_field("Month")
            .add_value_field("Profit", Aggregation::Average),
    )
    .unwrap();
    assert!(matches!(
        wb.build(),
        Err(Error::InvalidField { field, .. }) if field == "Profit"
    ));
}

#[test]
fn test_pivot_sheets_must_exist() {
    let mut wb = WorkbookBuilder::with_engine(RecordingEngine::new());
    with_sales_data(&mut wb);
    assert!(matches!(
        wb.add_pivot_table(revenue_by("Region").target("Nowhere!A1")),
        Err(Error::UnknownSheet(_))
    ));

    wb.add_pivot_table(revenue_by("Region").source("Archive!A1:C3"))
        .unwrap();
    assert!(matches!(
        wb.build(),
        Err(Error::UnknownSheet(name)) if name == "Archive"
    ));
}

#[test]
fn test_pivot_on_sheet_builder_targets_that_sheet() {
    let mut wb = WorkbookBuilder::<XlsxEngine>::new();
    with_sales_data(&mut wb);
    wb.sheet("Summary")
        .unwrap()
        .pivot_table(
            PivotTableBuilder::new("ByRegion")
                .source("Data!A1:C3")
                .target("B5")
                .add_row_field("Region")
                .add_named_value_field("Revenue", Aggregation::Max, "Best month"),
        )
        .unwrap();

    let built = wb.build().unwrap();
    let spec = &built.engine().pivot_tables()[0].spec;
    assert_eq!(spec.target_sheet, "Summary");
    assert_eq!(spec.target_cell.to_string(), "B5");
    assert_eq!(spec.value_fields[0].caption(), "Best month");
}

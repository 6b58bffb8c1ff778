//! # sheetcraft
//!
//! Fluent builders for styled spreadsheet workbooks.
//!
//! - Equal [`StyleConfig`]s are stored once in a [`StyleRegistry`] and registered
//!   with the engine on first use, so a workbook never carries duplicate styles
//! - Sheets, rows and cells are described through borrowed builders and handed to
//!   a [`SpreadsheetEngine`] by [`WorkbookBuilder::build`]
//! - Charts, pivot tables and data validation rules are declared alongside cells
//! - [`ReportAssembler`] computes the rows of many sheets in parallel
//!
//! The bundled engine is [`XlsxEngine`], which saves XLSX files.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sheetcraft::prelude::*;
//!
//! # fn main() -> sheetcraft::Result<()> {
//! let money = StyleConfig::new().bold(true).number_format(NumberFormat::currency());
//!
//! let mut workbook = WorkbookBuilder::new();
//! workbook
//!     .add_sheet("Report")?
//!     .row()?
//!     .cell("Revenue")?.done()
//!     .cell(1_200_000.0)?.style(&money).done();
//!
//! workbook.build()?.save_as("report.xlsx")?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod chart;
pub mod error;
pub mod pivot;
pub mod prelude;
pub mod registry;
pub mod report;
pub mod validation;

pub use builder::{BuiltWorkbook, CellBuilder, RowBuilder, SheetBuilder, WorkbookBuilder};
pub use chart::ChartBuilder;
pub use error::{BoxError, Error, Result};
pub use pivot::PivotTableBuilder;
pub use registry::{Flyweight, StyleEntry, StyleHandle, StyleRegistry};
pub use report::{ReportAssembler, RowSet};
pub use validation::DataValidationBuilder;

// Re-export the types builders are fed with
pub use sheetcraft_core::{
    Aggregation, Alignment, Border, BorderEdge, BorderLineStyle, CellAddress, CellRange,
    CellValue, ChartKind, Color, Criteria, Fill, Font, HorizontalAlignment, LegendPosition,
    NumberFormat, PatternType, SpreadsheetEngine, StyleConfig, StyleId, Underline,
    ValidationErrorStyle, ValidationOperator, VerticalAlignment,
};
pub use sheetcraft_xlsx::{CompressionLevel, SaveOptions, XlsxEngine, XlsxReader};

//! Prelude module - common imports for sheetcraft users
//!
//! ```rust
//! use sheetcraft::prelude::*;
//! ```

pub use crate::{
    // Builders
    BuiltWorkbook,
    ChartBuilder,
    DataValidationBuilder,
    PivotTableBuilder,
    ReportAssembler,
    RowSet,
    WorkbookBuilder,

    // Styles
    Color,
    Fill,
    Font,
    HorizontalAlignment,
    NumberFormat,
    StyleConfig,
    StyleRegistry,
    VerticalAlignment,

    // Values and descriptors
    Aggregation,
    CellValue,
    ChartKind,
    Criteria,
    LegendPosition,
    ValidationErrorStyle,

    // Engines
    SpreadsheetEngine,
    XlsxEngine,

    // Errors
    Error,
    Result,
};

//! # sheetcraft-core
//!
//! Core data types shared by the sheetcraft crates.
//!
//! This crate provides:
//! - [`CellAddress`], [`CellRange`] and [`SheetRange`] - A1-style addressing
//! - [`CellValue`] - Typed values written to cells
//! - [`StyleConfig`] - Immutable, value-comparable cell formatting
//! - [`DataValidation`], [`ChartSpec`], [`PivotTableSpec`] - Descriptors handed to an engine
//! - [`SpreadsheetEngine`] - The narrow interface a backing spreadsheet engine implements
//!
//! ## Example
//!
//! ```rust
//! use sheetcraft_core::{CellAddress, NumberFormat, SheetRange, StyleConfig};
//!
//! let addr = CellAddress::parse("B1").unwrap();
//! assert_eq!((addr.row, addr.col), (0, 1));
//!
//! let source = SheetRange::parse("'Q1 Sales'!A1:C10").unwrap();
//! assert_eq!(source.sheet, "Q1 Sales");
//!
//! let currency = StyleConfig::new().bold(true).number_format(NumberFormat::currency());
//! assert!(currency.font().bold);
//! ```

pub mod cell;
pub mod chart;
pub mod engine;
pub mod error;
pub mod pivot;
pub mod style;
pub mod validation;

pub use cell::{CellAddress, CellRange, CellValue, SheetRange};
pub use chart::{ChartAnchor, ChartKind, ChartSeries, ChartSpec, LegendPosition};
pub use engine::SpreadsheetEngine;
pub use error::{Error, Result};
pub use pivot::{Aggregation, PivotTableSpec, PivotValueField};
pub use style::{
    Alignment, Border, BorderEdge, BorderLineStyle, Color, Fill, Font, HorizontalAlignment,
    NumberFormat, PatternType, StyleConfig, StyleId, Underline, VerticalAlignment,
};
pub use validation::{
    Criteria, DataValidation, ListSource, ValidationErrorStyle, ValidationKind, ValidationOperator,
};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters a spreadsheet application refuses in sheet names
const INVALID_SHEET_NAME_CHARS: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

/// Check that `name` is usable as a sheet name.
///
/// Uniqueness is the caller's concern; this only checks the name itself.
pub fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidSheetName("sheet name cannot be empty".into()));
    }

    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(Error::InvalidSheetName(format!(
            "'{}' is longer than {} characters",
            name, MAX_SHEET_NAME_LEN
        )));
    }

    if let Some(c) = name.chars().find(|c| INVALID_SHEET_NAME_CHARS.contains(c)) {
        return Err(Error::InvalidSheetName(format!(
            "'{}' contains invalid character '{}'",
            name, c
        )));
    }

    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(Error::InvalidSheetName(format!(
            "'{}' cannot begin or end with an apostrophe",
            name
        )));
    }

    Ok(())
}

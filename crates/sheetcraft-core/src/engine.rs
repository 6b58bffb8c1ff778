//! The interface a backing spreadsheet engine implements
//!
//! Builders never touch a file format directly. Everything they produce goes
//! through this trait, so an in-memory engine, a file writer, or a test double
//! can stand behind the same fluent API.

use crate::cell::{CellAddress, CellRange, CellValue};
use crate::chart::ChartSpec;
use crate::error::Result;
use crate::pivot::PivotTableSpec;
use crate::style::{StyleConfig, StyleId};
use crate::validation::DataValidation;
use std::path::Path;

/// Low-level workbook operations
///
/// Sheets are addressed by name. Implementations report unknown sheets with
/// [`crate::Error::SheetNotFound`].
pub trait SpreadsheetEngine {
    /// Append a sheet and return its 0-based index
    fn create_sheet(&mut self, name: &str) -> Result<usize>;

    fn set_cell_value(&mut self, sheet: &str, cell: CellAddress, value: CellValue) -> Result<()>;

    /// Translate a style into the engine's own representation and return its id
    fn register_style(&mut self, style: &StyleConfig) -> Result<StyleId>;

    fn set_cell_style(&mut self, sheet: &str, cell: CellAddress, style: StyleId) -> Result<()>;

    fn merge_cells(&mut self, sheet: &str, range: CellRange) -> Result<()>;

    /// Width in characters of the default font
    fn set_column_width(&mut self, sheet: &str, col: u16, width: f64) -> Result<()>;

    /// Height in points; `row` is 0-based
    fn set_row_height(&mut self, sheet: &str, row: u32, height: f64) -> Result<()>;

    /// Freeze rows above and columns left of `cell`
    fn freeze_panes(&mut self, sheet: &str, cell: CellAddress) -> Result<()>;

    fn add_data_validation(&mut self, sheet: &str, rule: &DataValidation) -> Result<()>;

    fn add_chart(&mut self, sheet: &str, chart: &ChartSpec) -> Result<()>;

    /// Add a pivot table; the descriptor names its target sheet
    fn add_pivot_table(&mut self, pivot: &PivotTableSpec) -> Result<()>;

    fn set_active_sheet(&mut self, index: usize) -> Result<()>;

    fn save_as(&mut self, path: &Path) -> Result<()>;

    /// Read a value back
    ///
    /// `None` means the engine cannot be inspected, which is different from an
    /// empty cell (`Some(CellValue::Empty)`).
    fn cell_value(&self, _sheet: &str, _cell: CellAddress) -> Option<CellValue> {
        None
    }

    /// Read back the style applied to a cell, `None` when not inspectable or unstyled
    fn cell_style(&self, _sheet: &str, _cell: CellAddress) -> Option<StyleId> {
        None
    }
}

impl<E: SpreadsheetEngine + ?Sized> SpreadsheetEngine for Box<E> {
    fn create_sheet(&mut self, name: &str) -> Result<usize> {
        (**self).create_sheet(name)
    }

    fn set_cell_value(&mut self, sheet: &str, cell: CellAddress, value: CellValue) -> Result<()> {
        (**self).set_cell_value(sheet, cell, value)
    }

    fn register_style(&mut self, style: &StyleConfig) -> Result<StyleId> {
        (**self).register_style(style)
    }

    fn set_cell_style(&mut self, sheet: &str, cell: CellAddress, style: StyleId) -> Result<()> {
        (**self).set_cell_style(sheet, cell, style)
    }

    fn merge_cells(&mut self, sheet: &str, range: CellRange) -> Result<()> {
        (**self).merge_cells(sheet, range)
    }

    fn set_column_width(&mut self, sheet: &str, col: u16, width: f64) -> Result<()> {
        (**self).set_column_width(sheet, col, width)
    }

    fn set_row_height(&mut self, sheet: &str, row: u32, height: f64) -> Result<()> {
        (**self).set_row_height(sheet, row, height)
    }

    fn freeze_panes(&mut self, sheet: &str, cell: CellAddress) -> Result<()> {
        (**self).freeze_panes(sheet, cell)
    }

    fn add_data_validation(&mut self, sheet: &str, rule: &DataValidation) -> Result<()> {
        (**self).add_data_validation(sheet, rule)
    }

    fn add_chart(&mut self, sheet: &str, chart: &ChartSpec) -> Result<()> {
        (**self).add_chart(sheet, chart)
    }

    fn add_pivot_table(&mut self, pivot: &PivotTableSpec) -> Result<()> {
        (**self).add_pivot_table(pivot)
    }

    fn set_active_sheet(&mut self, index: usize) -> Result<()> {
        (**self).set_active_sheet(index)
    }

    fn save_as(&mut self, path: &Path) -> Result<()> {
        (**self).save_as(path)
    }

    fn cell_value(&self, sheet: &str, cell: CellAddress) -> Option<CellValue> {
        (**self).cell_value(sheet, cell)
    }

    fn cell_style(&self, sheet: &str, cell: CellAddress) -> Option<StyleId> {
        (**self).cell_style(sheet, cell)
    }
}

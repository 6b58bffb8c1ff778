//! Fluent workbook builders
//!
//! [`WorkbookBuilder`] hands out a [`SheetBuilder`] per sheet, which hands out a
//! [`RowBuilder`] per row, which hands out a [`CellBuilder`] per cell. Each child
//! borrows its parent mutably, and `done()` gives the parent back:
//!
//! ```rust
//! use sheetcraft::prelude::*;
//!
//! # fn main() -> sheetcraft::Result<()> {
//! let header = StyleConfig::new().bold(true);
//! let mut workbook = WorkbookBuilder::new();
//! workbook
//!     .add_sheet("Report")?
//!     .row()?
//!     .cell("Region")?.style(&header).done()
//!     .cell("Revenue")?.style(&header).done()
//!     .done()
//!     .row()?
//!     .cell("North")?.done()
//!     .cell(1200.0)?.done();
//! let built = workbook.build()?;
//! assert_eq!(built.registry().registered_count(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! Values, styles, merges, validations, charts and pivot tables are recorded and
//! handed to the engine by [`WorkbookBuilder::build`]. Column widths, row heights
//! and frozen panes go to the engine as soon as they are declared.

mod cell;
mod row;
mod sheet;
mod workbook;

pub use cell::CellBuilder;
pub use row::RowBuilder;
pub use sheet::SheetBuilder;
pub use workbook::{BuiltWorkbook, WorkbookBuilder};

use std::collections::BTreeMap;

use sheetcraft_core::{
    CellAddress, CellRange, CellValue, ChartSpec, DataValidation, SpreadsheetEngine,
};

use crate::error::{Error, Result};
use crate::registry::{StyleHandle, StyleRegistry};

/// Recorded content of one cell
#[derive(Debug, Clone, Default)]
pub(crate) struct CellModel {
    pub value: CellValue,
    pub style: Option<StyleHandle>,
}

/// Recorded content of one sheet
#[derive(Debug, Clone)]
pub(crate) struct SheetModel {
    pub name: String,
    /// Cells keyed by (row, column), both 0-based
    pub cells: BTreeMap<(u32, u16), CellModel>,
    /// Next unused row, 0-based
    pub next_row: u32,
    pub merges: Vec<CellRange>,
    pub validations: Vec<DataValidation>,
    pub charts: Vec<ChartSpec>,
}

impl SheetModel {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            next_row: 0,
            merges: Vec::new(),
            validations: Vec::new(),
            charts: Vec::new(),
        }
    }

    pub fn cell_mut(&mut self, addr: CellAddress) -> &mut CellModel {
        self.cells.entry((addr.row, addr.col)).or_default()
    }

    /// Fail on the first pair of merged ranges sharing a cell
    pub fn check_merges(&self) -> Result<()> {
        for (i, first) in self.merges.iter().enumerate() {
            if let Some(second) = self.merges[i + 1..].iter().find(|m| m.overlaps(first)) {
                return Err(Error::OverlappingMerge {
                    sheet: self.name.clone(),
                    first: *first,
                    second: *second,
                });
            }
        }
        Ok(())
    }

    /// Hand the recorded content to the engine
    pub fn materialize<E: SpreadsheetEngine + ?Sized>(
        &self,
        engine: &mut E,
        registry: &mut StyleRegistry,
        sheet_names: &[String],
    ) -> Result<()> {
        let name = self.name.as_str();

        for (&(row, col), cell) in &self.cells {
            let addr = CellAddress::new(row, col);
            if cell.value != CellValue::Empty {
                engine
                    .set_cell_value(name, addr, cell.value.clone())
                    .map_err(|e| Error::engine(format!("write {}!{}", name, addr), e))?;
            }
            if let Some(handle) = cell.style {
                registry.apply(handle, engine, name, addr)?;
            }
        }

        for range in &self.merges {
            engine
                .merge_cells(name, *range)
                .map_err(|e| Error::engine(format!("merge {}!{}", name, range), e))?;
        }

        for rule in &self.validations {
            engine
                .add_data_validation(name, rule)
                .map_err(|e| Error::engine(format!("add validation {} to '{}'", rule, name), e))?;
        }

        for chart in &self.charts {
            for referenced in chart.referenced_sheets() {
                if !contains_sheet(sheet_names, referenced) {
                    return Err(Error::UnknownSheet(referenced.to_string()));
                }
            }
            engine
                .add_chart(name, chart)
                .map_err(|e| Error::engine(format!("add chart to '{}'", name), e))?;
        }

        tracing::debug!(
            sheet = name,
            cells = self.cells.len(),
            merges = self.merges.len(),
            validations = self.validations.len(),
            charts = self.charts.len(),
            "materialized sheet"
        );
        Ok(())
    }
}

/// Case-insensitive sheet name lookup
pub(crate) fn sheet_position(names: &[String], name: &str) -> Option<usize> {
    names.iter().position(|n| n.eq_ignore_ascii_case(name))
}

pub(crate) fn contains_sheet(names: &[String], name: &str) -> bool {
    sheet_position(names, name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_merges() {
        let mut sheet = SheetModel::new("Data");
        sheet.merges.push(CellRange::parse("A1:B2").unwrap());
        sheet.merges.push(CellRange::parse("C1:D2").unwrap());
        assert!(sheet.check_merges().is_ok());

        sheet.merges.push(CellRange::parse("B2:C3").unwrap());
        match sheet.check_merges() {
            Err(Error::OverlappingMerge { first, second, .. }) => {
                assert_eq!(first, CellRange::parse("A1:B2").unwrap());
                assert_eq!(second, CellRange::parse("B2:C3").unwrap());
            }
            other => panic!("expected overlapping merge, got {:?}", other),
        }
    }

    #[test]
    fn test_sheet_position_ignores_case() {
        let names = vec!["Data".to_string(), "Summary".to_string()];
        assert_eq!(sheet_position(&names, "summary"), Some(1));
        assert!(!contains_sheet(&names, "Missing"));
    }
}

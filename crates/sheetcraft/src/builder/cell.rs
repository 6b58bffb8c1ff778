use sheetcraft_core::{CellAddress, CellRange, SpreadsheetEngine, StyleConfig};

use super::RowBuilder;
use crate::error::{Error, Result};
use crate::registry::StyleHandle;
use crate::validation::DataValidationBuilder;

/// Builder for one written cell, borrowed from its [`RowBuilder`]
pub struct CellBuilder<'r, 's, 'wb, E: SpreadsheetEngine> {
    row: &'r mut RowBuilder<'s, 'wb, E>,
    addr: CellAddress,
}

impl<'r, 's, 'wb, E: SpreadsheetEngine> CellBuilder<'r, 's, 'wb, E> {
    pub(crate) fn new(row: &'r mut RowBuilder<'s, 'wb, E>, addr: CellAddress) -> Self {
        Self { row, addr }
    }

    pub fn address(&self) -> CellAddress {
        self.addr
    }

    /// Style the cell; equal configurations share one registry entry
    pub fn style(mut self, config: &StyleConfig) -> Self {
        let handle = self.row.sheet_mut().workbook_mut().registry.resolve(config);
        self.style_handle(handle)
    }

    /// Style the cell with a handle from this workbook's registry
    pub fn style_handle(mut self, handle: StyleHandle) -> Self {
        let addr = self.addr;
        self.row.sheet_mut().model_mut().cell_mut(addr).style = Some(handle);
        self
    }

    /// Merge from this cell to `end` (e.g. `"C1"`), which must not lie above or
    /// left of this cell
    pub fn merge_to(mut self, end: &str) -> Result<Self> {
        let end = CellAddress::parse(end)?;
        let range = CellRange::from_corners(self.addr, end).map_err(|e| match e {
            sheetcraft_core::Error::InvalidRange(reason) => Error::InvalidRange(reason),
            other => Error::Core(other),
        })?;
        self.row.sheet_mut().model_mut().merges.push(range);
        Ok(self)
    }

    /// Attach a validation rule covering just this cell
    pub fn validate(mut self, rule: DataValidationBuilder) -> Result<Self> {
        let rule = rule.range(CellRange::single(self.addr)).build()?;
        self.row.sheet_mut().model_mut().validations.push(rule);
        Ok(self)
    }

    /// Return to the row
    pub fn done(self) -> &'r mut RowBuilder<'s, 'wb, E> {
        self.row
    }
}

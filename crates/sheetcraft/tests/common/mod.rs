//! Test engine recording every call it receives

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;

use sheetcraft_core::{
    CellAddress, CellRange, CellValue, ChartSpec, DataValidation, Error, PivotTableSpec, Result,
    SpreadsheetEngine, StyleConfig, StyleId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateSheet(String),
    SetValue(String, CellAddress, CellValue),
    RegisterStyle(StyleConfig),
    SetStyle(String, CellAddress, StyleId),
    Merge(String, CellRange),
    ColumnWidth(String, u16, f64),
    RowHeight(String, u32, f64),
    Freeze(String, CellAddress),
    Validation(String, DataValidation),
    Chart(String, ChartSpec),
    Pivot(PivotTableSpec),
    ActiveSheet(usize),
    Save(String),
}

/// Engine that remembers calls and cell values
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub calls: Vec<Call>,
    pub sheets: Vec<String>,
    pub values: HashMap<(String, CellAddress), CellValue>,
    /// Report no cell values, like an engine without read-back
    pub opaque: bool,
    /// Reject every style registration
    pub reject_styles: bool,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opaque() -> Self {
        Self {
            opaque: true,
            ..Self::default()
        }
    }

    pub fn registrations(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::RegisterStyle(_)))
            .count()
    }

    pub fn styles_applied(&self) -> Vec<(CellAddress, StyleId)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::SetStyle(_, addr, id) => Some((*addr, *id)),
                _ => None,
            })
            .collect()
    }

    fn check_sheet(&self, sheet: &str) -> Result<()> {
        if self.sheets.iter().any(|s| s.eq_ignore_ascii_case(sheet)) {
            Ok(())
        } else {
            Err(Error::SheetNotFound(sheet.to_string()))
        }
    }
}

impl SpreadsheetEngine for RecordingEngine {
    fn create_sheet(&mut self, name: &str) -> Result<usize> {
        self.sheets.push(name.to_string());
        self.calls.push(Call::CreateSheet(name.to_string()));
        Ok(self.sheets.len() - 1)
    }

    fn set_cell_value(&mut self, sheet: &str, cell: CellAddress, value: CellValue) -> Result<()> {
        self.check_sheet(sheet)?;
        self.values
            .insert((sheet.to_string(), cell), value.clone());
        self.calls.push(Call::SetValue(sheet.to_string(), cell, value));
        Ok(())
    }

    fn register_style(&mut self, style: &StyleConfig) -> Result<StyleId> {
        if self.reject_styles {
            return Err(Error::InvalidStyle("styles are disabled".into()));
        }
        self.calls.push(Call::RegisterStyle(style.clone()));
        Ok(StyleId(self.registrations() as u32))
    }

    fn set_cell_style(&mut self, sheet: &str, cell: CellAddress, style: StyleId) -> Result<()> {
        self.check_sheet(sheet)?;
        self.calls.push(Call::SetStyle(sheet.to_string(), cell, style));
        Ok(())
    }

    fn merge_cells(&mut self, sheet: &str, range: CellRange) -> Result<()> {
        self.check_sheet(sheet)?;
        self.calls.push(Call::Merge(sheet.to_string(), range));
        Ok(())
    }

    fn set_column_width(&mut self, sheet: &str, col: u16, width: f64) -> Result<()> {
        self.check_sheet(sheet)?;
        self.calls.push(Call::ColumnWidth(sheet.to_string(), col, width));
        Ok(())
    }

    fn set_row_height(&mut self, sheet: &str, row: u32, height: f64) -> Result<()> {
        self.check_sheet(sheet)?;
        self.calls.push(Call::RowHeight(sheet.to_string(), row, height));
        Ok(())
    }

    fn freeze_panes(&mut self, sheet: &str, cell: CellAddress) -> Result<()> {
        self.check_sheet(sheet)?;
        self.calls.push(Call::Freeze(sheet.to_string(), cell));
        Ok(())
    }

    fn add_data_validation(&mut self, sheet: &str, rule: &DataValidation) -> Result<()> {
        self.check_sheet(sheet)?;
        self.calls.push(Call::Validation(sheet.to_string(), rule.clone()));
        Ok(())
    }

    fn add_chart(&mut self, sheet: &str, chart: &ChartSpec) -> Result<()> {
        self.check_sheet(sheet)?;
        self.calls.push(Call::Chart(sheet.to_string(), chart.clone()));
        Ok(())
    }

    fn add_pivot_table(&mut self, pivot: &PivotTableSpec) -> Result<()> {
        self.check_sheet(&pivot.target_sheet)?;
        self.calls.push(Call::Pivot(pivot.clone()));
        Ok(())
    }

    fn set_active_sheet(&mut self, index: usize) -> Result<()> {
        if index >= self.sheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.sheets.len()));
        }
        self.calls.push(Call::ActiveSheet(index));
        Ok(())
    }

    fn save_as(&mut self, path: &Path) -> Result<()> {
        self.calls.push(Call::Save(path.display().to_string()));
        Ok(())
    }

    fn cell_value(&self, sheet: &str, cell: CellAddress) -> Option<CellValue> {
        if self.opaque {
            return None;
        }
        self.check_sheet(sheet).ok()?;
        Some(
            self.values
                .get(&(sheet.to_string(), cell))
                .cloned()
                .unwrap_or_default(),
        )
    }
}

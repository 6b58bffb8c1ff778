use sheetcraft_core::{CellAddress, CellRange, MAX_ROWS, SpreadsheetEngine};

use super::{RowBuilder, SheetModel, WorkbookBuilder};
use crate::chart::ChartBuilder;
use crate::error::{Error, Result};
use crate::pivot::PivotTableBuilder;
use crate::validation::DataValidationBuilder;

/// Builder for one sheet, borrowed from its [`WorkbookBuilder`]
pub struct SheetBuilder<'wb, E: SpreadsheetEngine> {
    workbook: &'wb mut WorkbookBuilder<E>,
    index: usize,
}

impl<'wb, E: SpreadsheetEngine> SheetBuilder<'wb, E> {
    pub(crate) fn new(workbook: &'wb mut WorkbookBuilder<E>, index: usize) -> Self {
        Self { workbook, index }
    }

    pub fn name(&self) -> &str {
        &self.workbook.sheets[self.index].name
    }

    /// Number of rows handed out so far, which is also the last used row (1-based)
    pub fn last_row(&self) -> u32 {
        self.model().next_row
    }

    pub(crate) fn model(&self) -> &SheetModel {
        &self.workbook.sheets[self.index]
    }

    pub(crate) fn model_mut(&mut self) -> &mut SheetModel {
        &mut self.workbook.sheets[self.index]
    }

    pub(crate) fn workbook_mut(&mut self) -> &mut WorkbookBuilder<E> {
        &mut *self.workbook
    }

    /// Start the row after the last one used
    pub fn row(&mut self) -> Result<RowBuilder<'_, 'wb, E>> {
        let row = self.model().next_row;
        if row >= MAX_ROWS {
            return Err(sheetcraft_core::Error::RowOutOfBounds(row + 1, MAX_ROWS).into());
        }
        self.model_mut().next_row = row + 1;
        Ok(RowBuilder::new(self, row))
    }

    /// Jump forward to row `number` (1-based)
    pub fn row_at(&mut self, number: u32) -> Result<RowBuilder<'_, 'wb, E>> {
        if number == 0 || number > MAX_ROWS {
            return Err(sheetcraft_core::Error::RowOutOfBounds(number, MAX_ROWS).into());
        }
        let used = self.model().next_row;
        if number <= used {
            return Err(Error::CursorRewind {
                requested: format!("row {}", number),
                current: format!("row {}", used),
            });
        }
        self.model_mut().next_row = number;
        Ok(RowBuilder::new(self, number - 1))
    }

    /// Set the width of a column given by letters (`"B"`) in characters
    pub fn column_width(&mut self, column: &str, width: f64) -> Result<&mut Self> {
        let col = CellAddress::letters_to_column(column)?;
        self.column_width_at(col, width)
    }

    /// Set the width of a column given by 0-based index
    pub fn column_width_at(&mut self, col: u16, width: f64) -> Result<&mut Self> {
        let WorkbookBuilder { engine, sheets, .. } = &mut *self.workbook;
        let name = sheets[self.index].name.as_str();
        engine
            .set_column_width(name, col, width)
            .map_err(|e| Error::engine(format!("set column width on '{}'", name), e))?;
        Ok(self)
    }

    /// Freeze the rows above and the columns left of `cell`
    pub fn freeze_panes(&mut self, cell: &str) -> Result<&mut Self> {
        let addr = CellAddress::parse(cell)?;
        let WorkbookBuilder { engine, sheets, .. } = &mut *self.workbook;
        let name = sheets[self.index].name.as_str();
        engine
            .freeze_panes(name, addr)
            .map_err(|e| Error::engine(format!("freeze panes on '{}'", name), e))?;
        Ok(self)
    }

    /// Declare a merged region written start-first, e.g. `"A1:C1"`
    pub fn merge(&mut self, range: &str) -> Result<&mut Self> {
        let range = CellRange::parse_ordered(range).map_err(|e| match e {
            sheetcraft_core::Error::InvalidRange(reason) => Error::InvalidRange(reason),
            other => Error::InvalidRange(format!("'{}': {}", range, other)),
        })?;
        self.model_mut().merges.push(range);
        Ok(self)
    }

    /// Attach a validation rule to its ranges on this sheet
    pub fn data_validation(&mut self, rule: DataValidationBuilder) -> Result<&mut Self> {
        let rule = rule.build()?;
        self.model_mut().validations.push(rule);
        Ok(self)
    }

    /// Place a chart on this sheet
    pub fn chart(&mut self, chart: ChartBuilder) -> Result<&mut Self> {
        let chart = chart.build()?;
        self.model_mut().charts.push(chart);
        Ok(self)
    }

    /// Place a pivot table on this sheet
    pub fn pivot_table(&mut self, pivot: PivotTableBuilder) -> Result<&mut Self> {
        let spec = pivot.build_on(&self.model().name)?;
        self.workbook.push_pivot(spec)?;
        Ok(self)
    }

    /// Return to the workbook
    pub fn done(&mut self) -> &mut WorkbookBuilder<E> {
        &mut *self.workbook
    }
}

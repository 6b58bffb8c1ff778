use sheetcraft_core::{CellAddress, CellValue, SpreadsheetEngine, StyleConfig, MAX_COLS};

use super::{CellBuilder, SheetBuilder};
use crate::error::{Error, Result};

/// Builder for one row, borrowed from its [`SheetBuilder`]
///
/// The column cursor starts at `A` and only moves forward.
pub struct RowBuilder<'s, 'wb, E: SpreadsheetEngine> {
    sheet: &'s mut SheetBuilder<'wb, E>,
    row: u32,
    cursor: u16,
}

impl<'s, 'wb, E: SpreadsheetEngine> RowBuilder<'s, 'wb, E> {
    pub(crate) fn new(sheet: &'s mut SheetBuilder<'wb, E>, row: u32) -> Self {
        Self {
            sheet,
            row,
            cursor: 0,
        }
    }

    /// Row number as shown in a spreadsheet (1-based)
    pub fn number(&self) -> u32 {
        self.row + 1
    }

    pub(crate) fn sheet_mut(&mut self) -> &mut SheetBuilder<'wb, E> {
        &mut *self.sheet
    }

    /// Write `value` at the cursor and move the cursor one column right
    pub fn cell<V: Into<CellValue>>(&mut self, value: V) -> Result<CellBuilder<'_, 's, 'wb, E>> {
        let col = self.cursor;
        self.write(col, value.into())
    }

    /// Write at a column given by letters; the column must not lie before the cursor
    pub fn cell_at<V: Into<CellValue>>(
        &mut self,
        column: &str,
        value: V,
    ) -> Result<CellBuilder<'_, 's, 'wb, E>> {
        let col = CellAddress::letters_to_column(column)?;
        self.cell_at_index(col, value)
    }

    /// Write at a 0-based column index; the column must not lie before the cursor
    pub fn cell_at_index<V: Into<CellValue>>(
        &mut self,
        col: u16,
        value: V,
    ) -> Result<CellBuilder<'_, 's, 'wb, E>> {
        if col < self.cursor {
            return Err(Error::CursorRewind {
                requested: CellAddress::new(self.row, col).to_string(),
                current: CellAddress::new(self.row, self.cursor).to_string(),
            });
        }
        self.write(col, value.into())
    }

    /// Append several values, all with the same optional style
    pub fn cells<I, V>(&mut self, values: I, style: Option<&StyleConfig>) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        for value in values {
            let cell = self.cell(value)?;
            match style {
                Some(style) => cell.style(style).done(),
                None => cell.done(),
            };
        }
        Ok(self)
    }

    /// Set the height of this row in points
    pub fn height(&mut self, points: f64) -> Result<&mut Self> {
        let row = self.row;
        let name = self.sheet.name().to_string();
        self.sheet
            .workbook_mut()
            .engine
            .set_row_height(&name, row, points)
            .map_err(|e| Error::engine(format!("set height of row {} on '{}'", row + 1, name), e))?;
        Ok(self)
    }

    /// Return to the sheet
    pub fn done(&mut self) -> &mut SheetBuilder<'wb, E> {
        &mut *self.sheet
    }

    fn write(&mut self, col: u16, value: CellValue) -> Result<CellBuilder<'_, 's, 'wb, E>> {
        if col >= MAX_COLS {
            return Err(sheetcraft_core::Error::ColumnOutOfBounds(col as u32, MAX_COLS - 1).into());
        }
        let addr = CellAddress::new(self.row, col);
        self.sheet.model_mut().cell_mut(addr).value = value;
        self.cursor = col + 1;
        Ok(CellBuilder::new(self, addr))
    }
}

//! In-memory workbook that implements [`SpreadsheetEngine`]
//!
//! Every call mutates plain Rust collections. Nothing touches the disk until
//! [`SpreadsheetEngine::save_as`] or [`XlsxEngine::write_to`].

use std::collections::BTreeMap;
use std::io::{Seek, Write};
use std::path::Path;

use sheetcraft_core::{
    CellAddress, CellRange, CellValue, ChartSpec, DataValidation, Error, PivotTableSpec,
    Result, SpreadsheetEngine, StyleConfig, StyleId, MAX_COLS, MAX_ROWS,
};

use crate::error::XlsxResult;
use crate::options::SaveOptions;
use crate::writer::XlsxWriter;

/// Widest column the file format accepts, in characters
pub const MAX_COLUMN_WIDTH: f64 = 255.0;

/// Tallest row the file format accepts, in points
pub const MAX_ROW_HEIGHT: f64 = 409.0;

/// Largest font size the file format accepts, in points
pub const MAX_FONT_SIZE: f64 = 409.0;

/// A cell slot: its value and the engine style applied to it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: Option<StyleId>,
}

/// One worksheet of the workbook
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    name: String,
    cells: BTreeMap<(u32, u16), Cell>,
    merges: Vec<CellRange>,
    column_widths: BTreeMap<u16, f64>,
    row_heights: BTreeMap<u32, f64>,
    freeze: Option<CellAddress>,
    validations: Vec<DataValidation>,
    charts: Vec<ChartSpec>,
}

impl Worksheet {
    pub(crate) fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cell(&self, addr: CellAddress) -> Option<&Cell> {
        self.cells.get(&(addr.row, addr.col))
    }

    /// Value at `addr`, [`CellValue::Empty`] when nothing was written
    pub fn value(&self, addr: CellAddress) -> CellValue {
        self.cell(addr).map(|c| c.value.clone()).unwrap_or_default()
    }

    pub fn style_id(&self, addr: CellAddress) -> Option<StyleId> {
        self.cell(addr).and_then(|c| c.style)
    }

    /// Occupied cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &Cell)> {
        self.cells
            .iter()
            .map(|(&(row, col), cell)| (CellAddress::new(row, col), cell))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Smallest range covering every occupied cell
    pub fn dimension(&self) -> Option<CellRange> {
        let mut iter = self.cells.keys();
        let &(first_row, first_col) = iter.next()?;
        let (mut min_col, mut max_col, mut max_row) = (first_col, first_col, first_row);
        for &(row, col) in iter {
            min_col = min_col.min(col);
            max_col = max_col.max(col);
            max_row = max_row.max(row);
        }
        Some(CellRange::new(
            CellAddress::new(first_row, min_col),
            CellAddress::new(max_row, max_col),
        ))
    }

    pub fn merged_ranges(&self) -> &[CellRange] {
        &self.merges
    }

    pub fn column_width(&self, col: u16) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    pub fn column_widths(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.column_widths.iter().map(|(&c, &w)| (c, w))
    }

    /// Height of a 0-based row
    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }

    pub(crate) fn row_heights(&self) -> &BTreeMap<u32, f64> {
        &self.row_heights
    }

    pub fn freeze_panes(&self) -> Option<CellAddress> {
        self.freeze
    }

    pub fn validations(&self) -> &[DataValidation] {
        &self.validations
    }

    pub fn charts(&self) -> &[ChartSpec] {
        &self.charts
    }

    pub(crate) fn cell_mut(&mut self, addr: CellAddress) -> &mut Cell {
        self.cells.entry((addr.row, addr.col)).or_default()
    }

    pub(crate) fn set_value(&mut self, addr: CellAddress, value: CellValue) {
        if value.is_empty() {
            let key = (addr.row, addr.col);
            let unstyled = self.cells.get(&key).map_or(false, |c| c.style.is_none());
            if unstyled {
                self.cells.remove(&key);
                return;
            }
        }
        self.cell_mut(addr).value = value;
    }

    pub(crate) fn push_merge(&mut self, range: CellRange) {
        self.merges.push(range);
    }

    pub(crate) fn insert_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    pub(crate) fn insert_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    pub(crate) fn set_freeze(&mut self, cell: Option<CellAddress>) {
        self.freeze = cell;
    }
}

/// A pivot table together with the source header captured when it was added
#[derive(Debug, Clone, PartialEq)]
pub struct PivotEntry {
    pub spec: PivotTableSpec,
    pub headers: Vec<String>,
}

/// In-memory workbook backed by the XLSX file format
///
/// Style ids index [`XlsxEngine::style`]. Id 0 is the default style and every
/// successful [`SpreadsheetEngine::register_style`] call appends a new entry.
#[derive(Debug, Clone)]
pub struct XlsxEngine {
    sheets: Vec<Worksheet>,
    styles: Vec<StyleConfig>,
    pivots: Vec<PivotEntry>,
    active_sheet: usize,
    options: SaveOptions,
}

impl Default for XlsxEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl XlsxEngine {
    pub fn new() -> Self {
        Self {
            sheets: Vec::new(),
            styles: vec![StyleConfig::default()],
            pivots: Vec::new(),
            active_sheet: 0,
            options: SaveOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SaveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &SaveOptions {
        &self.options
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.sheets.iter()
    }

    /// Look up a sheet by name, ignoring ASCII case
    pub fn worksheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn style(&self, id: StyleId) -> Option<&StyleConfig> {
        self.styles.get(id.0 as usize)
    }

    /// Number of styles including the default one at id 0
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    pub fn styles(&self) -> &[StyleConfig] {
        &self.styles
    }

    pub fn pivot_tables(&self) -> &[PivotEntry] {
        &self.pivots
    }

    pub fn active_sheet(&self) -> usize {
        self.active_sheet
    }

    /// Write the package to any seekable writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> XlsxResult<()> {
        XlsxWriter::write(self, writer, &self.options)
    }

    /// Render the package into a byte buffer
    pub fn to_bytes(&self) -> XlsxResult<Vec<u8>> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    pub(crate) fn from_parts(
        sheets: Vec<Worksheet>,
        styles: Vec<StyleConfig>,
        active_sheet: usize,
    ) -> Self {
        let styles = if styles.is_empty() {
            vec![StyleConfig::default()]
        } else {
            styles
        };
        let active_sheet = active_sheet.min(sheets.len().saturating_sub(1));
        Self {
            sheets,
            styles,
            pivots: Vec::new(),
            active_sheet,
            options: SaveOptions::default(),
        }
    }

    fn sheet_index(&self, name: &str) -> Result<usize> {
        self.sheets
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut Worksheet> {
        let index = self.sheet_index(name)?;
        Ok(&mut self.sheets[index])
    }

    fn check_bounds(cell: CellAddress) -> Result<()> {
        if cell.row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(cell.row, MAX_ROWS - 1));
        }
        if cell.col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(cell.col as u32, MAX_COLS - 1));
        }
        Ok(())
    }

    fn check_style(style: &StyleConfig) -> Result<()> {
        style.format().validate()?;

        let font = style.font();
        if !(font.size > 0.0 && font.size <= MAX_FONT_SIZE) {
            return Err(Error::InvalidStyle(format!(
                "font size {} is outside 1-{}",
                font.size, MAX_FONT_SIZE
            )));
        }
        if font.name.trim().is_empty() {
            return Err(Error::InvalidStyle("font name cannot be empty".into()));
        }
        if font.name.chars().count() > 31 {
            return Err(Error::InvalidStyle(format!(
                "font name '{}' is longer than 31 characters",
                font.name
            )));
        }
        Ok(())
    }

    /// Header captions of a pivot source, read from this workbook
    fn pivot_headers(&self, spec: &PivotTableSpec) -> Result<Vec<String>> {
        let sheet = &self.sheets[self.sheet_index(&spec.source.sheet)?];
        Ok(spec
            .header_range()
            .first_row()
            .map(|addr| match sheet.value(addr) {
                CellValue::Empty => String::new(),
                other => other.to_string(),
            })
            .collect())
    }
}

impl SpreadsheetEngine for XlsxEngine {
    fn create_sheet(&mut self, name: &str) -> Result<usize> {
        sheetcraft_core::validate_sheet_name(name)?;
        if self.sheet_index(name).is_ok() {
            return Err(Error::DuplicateSheetName(name.to_string()));
        }
        self.sheets.push(Worksheet::new(name));
        log::debug!("created sheet '{}' at index {}", name, self.sheets.len() - 1);
        Ok(self.sheets.len() - 1)
    }

    fn set_cell_value(&mut self, sheet: &str, cell: CellAddress, value: CellValue) -> Result<()> {
        Self::check_bounds(cell)?;
        self.sheet_mut(sheet)?.set_value(cell, value);
        Ok(())
    }

    fn register_style(&mut self, style: &StyleConfig) -> Result<StyleId> {
        Self::check_style(style)?;
        let id = StyleId(self.styles.len() as u32);
        self.styles.push(style.clone());
        log::debug!("registered style {} ({})", id, style.summary());
        Ok(id)
    }

    fn set_cell_style(&mut self, sheet: &str, cell: CellAddress, style: StyleId) -> Result<()> {
        Self::check_bounds(cell)?;
        if style.0 as usize >= self.styles.len() {
            return Err(Error::UnknownStyle(style.0));
        }
        self.sheet_mut(sheet)?.cell_mut(cell).style = Some(style);
        Ok(())
    }

    fn merge_cells(&mut self, sheet: &str, range: CellRange) -> Result<()> {
        Self::check_bounds(range.end)?;
        let ws = self.sheet_mut(sheet)?;
        if let Some(existing) = ws.merges.iter().find(|m| m.overlaps(&range)) {
            return Err(Error::MergedCellConflict(format!(
                "{} (existing {})",
                range, existing
            )));
        }
        ws.push_merge(range);
        Ok(())
    }

    fn set_column_width(&mut self, sheet: &str, col: u16, width: f64) -> Result<()> {
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col as u32, MAX_COLS - 1));
        }
        if !(0.0..=MAX_COLUMN_WIDTH).contains(&width) {
            return Err(Error::backend(format!(
                "column width {} is outside 0-{}",
                width, MAX_COLUMN_WIDTH
            )));
        }
        self.sheet_mut(sheet)?.insert_column_width(col, width);
        Ok(())
    }

    fn set_row_height(&mut self, sheet: &str, row: u32, height: f64) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if !(0.0..=MAX_ROW_HEIGHT).contains(&height) {
            return Err(Error::backend(format!(
                "row height {} is outside 0-{}",
                height, MAX_ROW_HEIGHT
            )));
        }
        self.sheet_mut(sheet)?.insert_row_height(row, height);
        Ok(())
    }

    fn freeze_panes(&mut self, sheet: &str, cell: CellAddress) -> Result<()> {
        Self::check_bounds(cell)?;
        let freeze = if cell.row == 0 && cell.col == 0 {
            None
        } else {
            Some(cell)
        };
        self.sheet_mut(sheet)?.set_freeze(freeze);
        Ok(())
    }

    fn add_data_validation(&mut self, sheet: &str, rule: &DataValidation) -> Result<()> {
        if rule.ranges.is_empty() {
            return Err(Error::InvalidRange(format!("{} covers no cells", rule)));
        }
        self.sheet_mut(sheet)?.validations.push(rule.clone());
        Ok(())
    }

    fn add_chart(&mut self, sheet: &str, chart: &ChartSpec) -> Result<()> {
        for name in chart.referenced_sheets() {
            self.sheet_index(name)?;
        }
        self.sheet_mut(sheet)?.charts.push(chart.clone());
        log::debug!(
            "added {} chart with {} series to '{}'",
            chart.kind.name(),
            chart.series.len(),
            sheet
        );
        Ok(())
    }

    fn add_pivot_table(&mut self, pivot: &PivotTableSpec) -> Result<()> {
        self.sheet_index(&pivot.target_sheet)?;
        let headers = self.pivot_headers(pivot)?;
        if let Some(field) = pivot.missing_field(&headers) {
            return Err(Error::FieldNotFound {
                field: field.to_string(),
                source_range: pivot.source.to_string(),
            });
        }
        if self
            .pivots
            .iter()
            .any(|p| p.spec.name.eq_ignore_ascii_case(&pivot.name))
        {
            return Err(Error::backend(format!(
                "pivot table '{}' already exists",
                pivot.name
            )));
        }
        log::debug!("added pivot table '{}' over {}", pivot.name, pivot.source);
        self.pivots.push(PivotEntry {
            spec: pivot.clone(),
            headers,
        });
        Ok(())
    }

    fn set_active_sheet(&mut self, index: usize) -> Result<()> {
        if index >= self.sheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.sheets.len()));
        }
        self.active_sheet = index;
        Ok(())
    }

    fn save_as(&mut self, path: &Path) -> Result<()> {
        XlsxWriter::write_file(self, path, &self.options)?;
        log::info!("saved workbook to {}", path.display());
        Ok(())
    }

    fn cell_value(&self, sheet: &str, cell: CellAddress) -> Option<CellValue> {
        self.worksheet(sheet).map(|ws| ws.value(cell))
    }

    fn cell_style(&self, sheet: &str, cell: CellAddress) -> Option<StyleId> {
        self.worksheet(sheet).and_then(|ws| ws.style_id(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetcraft_core::{Aggregation, NumberFormat, PivotValueField, SheetRange};

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    #[test]
    fn test_sheets_and_values() {
        let mut engine = XlsxEngine::new();
        assert_eq!(engine.create_sheet("Data").unwrap(), 0);
        assert_eq!(engine.create_sheet("Summary").unwrap(), 1);
        assert!(matches!(
            engine.create_sheet("data"),
            Err(Error::DuplicateSheetName(_))
        ));

        engine
            .set_cell_value("Data", addr("B2"), CellValue::Number(3.5))
            .unwrap();
        assert_eq!(
            engine.cell_value("Data", addr("B2")),
            Some(CellValue::Number(3.5))
        );
        assert_eq!(
            engine.cell_value("Data", addr("A1")),
            Some(CellValue::Empty)
        );
        assert_eq!(engine.cell_value("Missing", addr("A1")), None);
        assert!(matches!(
            engine.set_cell_value("Missing", addr("A1"), CellValue::Number(1.0)),
            Err(Error::SheetNotFound(_))
        ));
        assert_eq!(engine.sheet_names(), vec!["Data", "Summary"]);
    }

    #[test]
    fn test_register_style_appends() {
        let mut engine = XlsxEngine::new();
        let bold = StyleConfig::new().bold(true);
        let a = engine.register_style(&bold).unwrap();
        let b = engine.register_style(&bold).unwrap();
        assert_eq!(a, StyleId(1));
        assert_eq!(b, StyleId(2));
        assert_eq!(engine.style_count(), 3);
        assert_eq!(engine.style(a), Some(&bold));
    }

    #[test]
    fn test_register_style_rejects_bad_input() {
        let mut engine = XlsxEngine::new();
        let bad_format = StyleConfig::new().number_format(NumberFormat::custom("[Red"));
        assert!(matches!(
            engine.register_style(&bad_format),
            Err(Error::InvalidNumberFormat { .. })
        ));
        let bad_size = StyleConfig::new().font_size(0.0);
        assert!(matches!(
            engine.register_style(&bad_size),
            Err(Error::InvalidStyle(_))
        ));
        assert_eq!(engine.style_count(), 1);
    }

    #[test]
    fn test_set_cell_style_unknown_id() {
        let mut engine = XlsxEngine::new();
        engine.create_sheet("S").unwrap();
        assert!(matches!(
            engine.set_cell_style("S", addr("A1"), StyleId(7)),
            Err(Error::UnknownStyle(7))
        ));
    }

    #[test]
    fn test_merge_conflict() {
        let mut engine = XlsxEngine::new();
        engine.create_sheet("S").unwrap();
        engine
            .merge_cells("S", CellRange::parse("A1:C1").unwrap())
            .unwrap();
        assert!(matches!(
            engine.merge_cells("S", CellRange::parse("C1:D2").unwrap()),
            Err(Error::MergedCellConflict(_))
        ));
        engine
            .merge_cells("S", CellRange::parse("A2:B2").unwrap())
            .unwrap();
        assert_eq!(engine.worksheet("S").unwrap().merged_ranges().len(), 2);
    }

    #[test]
    fn test_column_width_bounds() {
        let mut engine = XlsxEngine::new();
        engine.create_sheet("S").unwrap();
        engine.set_column_width("S", 0, 18.0).unwrap();
        assert!(engine.set_column_width("S", 1, 300.0).is_err());
        assert_eq!(engine.worksheet("S").unwrap().column_width(0), Some(18.0));
    }

    #[test]
    fn test_pivot_checks_header() {
        let mut engine = XlsxEngine::new();
        engine.create_sheet("Data").unwrap();
        engine.create_sheet("Pivot").unwrap();
        for (cell, text) in [("A1", "Region"), ("B1", "Revenue")] {
            engine
                .set_cell_value("Data", addr(cell), CellValue::from(text))
                .unwrap();
        }

        let mut spec = PivotTableSpec {
            name: "P1".into(),
            source: SheetRange::parse("Data!A1:B10").unwrap(),
            target_sheet: "Pivot".into(),
            target_cell: addr("A3"),
            row_fields: vec!["Region".into()],
            column_fields: vec![],
            value_fields: vec![PivotValueField::new("Revenue", Aggregation::Sum)],
        };
        engine.add_pivot_table(&spec).unwrap();
        assert_eq!(engine.pivot_tables()[0].headers, vec!["Region", "Revenue"]);

        spec.name = "P2".into();
        spec.row_fields = vec!["Country".into()];
        match engine.add_pivot_table(&spec) {
            Err(Error::FieldNotFound { field, .. }) => assert_eq!(field, "Country"),
            other => panic!("expected FieldNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_active_sheet_bounds() {
        let mut engine = XlsxEngine::new();
        engine.create_sheet("A").unwrap();
        engine.create_sheet("B").unwrap();
        engine.set_active_sheet(1).unwrap();
        assert_eq!(engine.active_sheet(), 1);
        assert!(matches!(
            engine.set_active_sheet(2),
            Err(Error::SheetOutOfBounds(2, 2))
        ));
    }
}

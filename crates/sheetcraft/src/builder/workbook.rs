use std::path::Path;

use sheetcraft_core::{CellValue, PivotTableSpec, SpreadsheetEngine};
use sheetcraft_xlsx::XlsxEngine;

use super::{contains_sheet, sheet_position, SheetBuilder, SheetModel};
use crate::error::{Error, Result};
use crate::pivot::PivotTableBuilder;
use crate::registry::StyleRegistry;

/// Entry point of a workbook session
///
/// The builder owns the engine from the start; sheets are created on the engine
/// as soon as they are added.
#[derive(Debug)]
pub struct WorkbookBuilder<E: SpreadsheetEngine = XlsxEngine> {
    pub(crate) engine: E,
    pub(crate) registry: StyleRegistry,
    pub(crate) sheets: Vec<SheetModel>,
    pub(crate) pivots: Vec<PivotTableSpec>,
    active: Option<String>,
}

impl WorkbookBuilder<XlsxEngine> {
    /// Create a builder over the bundled XLSX engine
    pub fn new() -> Self {
        Self::with_engine(XlsxEngine::new())
    }
}

impl Default for WorkbookBuilder<XlsxEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SpreadsheetEngine> WorkbookBuilder<E> {
    /// Create a builder over any engine
    pub fn with_engine(engine: E) -> Self {
        Self {
            engine,
            registry: StyleRegistry::new(),
            sheets: Vec::new(),
            pivots: Vec::new(),
            active: None,
        }
    }

    /// Replace the style registry, e.g. with one seeded from existing engine styles
    pub fn with_registry(mut self, registry: StyleRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Sheet names in tab order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Whether a sheet with this name (ignoring case) was added
    pub fn has_sheet(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Add a sheet at the end of the tab order
    pub fn add_sheet(&mut self, name: &str) -> Result<SheetBuilder<'_, E>> {
        if self.position(name).is_some() {
            return Err(Error::DuplicateSheet(name.to_string()));
        }
        sheetcraft_core::validate_sheet_name(name).map_err(|e| match e {
            sheetcraft_core::Error::InvalidSheetName(reason) => Error::InvalidSheetName(reason),
            other => Error::Core(other),
        })?;
        self.engine
            .create_sheet(name)
            .map_err(|e| Error::engine(format!("create sheet '{}'", name), e))?;
        self.sheets.push(SheetModel::new(name));
        let index = self.sheets.len() - 1;
        tracing::debug!(sheet = name, index, "added sheet");
        Ok(SheetBuilder::new(self, index))
    }

    /// Reopen a sheet added earlier
    pub fn sheet(&mut self, name: &str) -> Result<SheetBuilder<'_, E>> {
        let index = self
            .position(name)
            .ok_or_else(|| Error::UnknownSheet(name.to_string()))?;
        Ok(SheetBuilder::new(self, index))
    }

    /// Select the sheet shown when the file is opened
    pub fn set_active_sheet(&mut self, name: &str) -> Result<&mut Self> {
        let index = self
            .position(name)
            .ok_or_else(|| Error::UnknownSheet(name.to_string()))?;
        self.active = Some(self.sheets[index].name.clone());
        Ok(self)
    }

    /// Record a pivot table whose target sheet is named in the builder
    pub fn add_pivot_table(&mut self, pivot: PivotTableBuilder) -> Result<&mut Self> {
        let spec = pivot.build()?;
        self.push_pivot(spec)?;
        Ok(self)
    }

    pub(crate) fn push_pivot(&mut self, spec: PivotTableSpec) -> Result<()> {
        if self.position(&spec.target_sheet).is_none() {
            return Err(Error::UnknownSheet(spec.target_sheet));
        }
        self.pivots.push(spec);
        Ok(())
    }

    /// Rows already handed out on `name`, if the sheet exists
    pub(crate) fn rows_used(&self, name: &str) -> Option<u32> {
        self.position(name).map(|i| self.sheets[i].next_row)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Hand every recorded declaration to the engine
    ///
    /// Merged ranges of all sheets are checked for overlaps before anything is
    /// written. Then, per sheet in tab order: values and styles, merges,
    /// validations, charts. Pivot tables follow, then the active sheet.
    pub fn build(self) -> Result<BuiltWorkbook<E>> {
        let Self {
            mut engine,
            mut registry,
            sheets,
            pivots,
            active,
        } = self;

        for sheet in &sheets {
            sheet.check_merges()?;
        }

        let names: Vec<String> = sheets.iter().map(|s| s.name.clone()).collect();
        for sheet in &sheets {
            sheet.materialize(&mut engine, &mut registry, &names)?;
        }

        for pivot in &pivots {
            add_pivot(&mut engine, pivot, &names)?;
        }

        if let Some(active) = active {
            if let Some(index) = sheet_position(&names, &active) {
                engine
                    .set_active_sheet(index)
                    .map_err(|e| Error::engine(format!("activate sheet '{}'", active), e))?;
            }
        }

        tracing::debug!(
            sheets = names.len(),
            styles = registry.registered_count(),
            pivots = pivots.len(),
            "built workbook"
        );
        Ok(BuiltWorkbook { engine, registry })
    }
}

/// Check pivot field names against the header row, then add the pivot table.
///
/// Engines that cannot report cell values leave the field check to their own
/// `add_pivot_table`.
fn add_pivot<E: SpreadsheetEngine + ?Sized>(
    engine: &mut E,
    pivot: &PivotTableSpec,
    names: &[String],
) -> Result<()> {
    for sheet in [&pivot.source.sheet, &pivot.target_sheet] {
        if !contains_sheet(names, sheet) {
            return Err(Error::UnknownSheet(sheet.clone()));
        }
    }

    let headers: Option<Vec<String>> = pivot
        .header_range()
        .first_row()
        .map(|addr| {
            engine
                .cell_value(&pivot.source.sheet, addr)
                .map(|value| match value {
                    CellValue::Empty => String::new(),
                    other => other.to_string(),
                })
        })
        .collect();

    match headers {
        Some(headers) => {
            if let Some(field) = pivot.missing_field(&headers) {
                return Err(Error::InvalidField {
                    field: field.to_string(),
                    source_range: pivot.source.to_string(),
                });
            }
        }
        None => tracing::warn!(
            pivot = %pivot.name,
            source = %pivot.source,
            "engine cannot report header cells, leaving field checks to the engine"
        ),
    }

    engine.add_pivot_table(pivot).map_err(|e| match e {
        sheetcraft_core::Error::FieldNotFound {
            field,
            source_range,
        } => Error::InvalidField {
            field,
            source_range,
        },
        other => Error::engine(format!("add pivot table '{}'", pivot.name), other),
    })
}

/// Workbook whose content has been handed to the engine
#[derive(Debug)]
pub struct BuiltWorkbook<E: SpreadsheetEngine = XlsxEngine> {
    engine: E,
    registry: StyleRegistry,
}

impl<E: SpreadsheetEngine> BuiltWorkbook<E> {
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Styles of the session, with the engine ids they were registered under
    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    /// Persist the workbook through the engine
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.engine
            .save_as(path)
            .map_err(|e| Error::engine(format!("save to {}", path.display()), e))?;
        tracing::debug!(path = %path.display(), "saved workbook");
        Ok(())
    }
}

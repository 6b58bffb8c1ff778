//! Pivot table builder

use sheetcraft_core::{
    Aggregation, CellAddress, PivotTableSpec, PivotValueField, SheetRange,
};

use crate::chart::parse_range;
use crate::error::{Error, Result};

/// Builds a [`PivotTableSpec`]
///
/// Field names are matched against the source header row when the workbook is
/// built, not here.
///
/// ```rust
/// use sheetcraft::PivotTableBuilder;
/// use sheetcraft_core::Aggregation;
///
/// let pivot = PivotTableBuilder::new("RevenueByRegion")
///     .source("Data!A1:D100")
///     .target("Summary!A3")
///     .add_row_field("Region")
///     .add_value_field("Revenue", Aggregation::Sum)
///     .build()
///     .unwrap();
/// assert_eq!(pivot.target_sheet, "Summary");
/// ```
#[derive(Debug, Clone)]
pub struct PivotTableBuilder {
    name: String,
    source: Option<String>,
    target: Option<String>,
    row_fields: Vec<String>,
    column_fields: Vec<String>,
    value_fields: Vec<PivotValueField>,
}

impl PivotTableBuilder {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            source: None,
            target: None,
            row_fields: Vec::new(),
            column_fields: Vec::new(),
            value_fields: Vec::new(),
        }
    }

    /// Source data including its header row, e.g. `"Data!A1:D100"`
    pub fn source<S: Into<String>>(mut self, range: S) -> Self {
        self.source = Some(range.into());
        self
    }

    /// Top-left cell of the table: `"Summary!A3"`, or `"A3"` when the pivot is
    /// added through a sheet builder
    pub fn target<S: Into<String>>(mut self, cell: S) -> Self {
        self.target = Some(cell.into());
        self
    }

    pub fn add_row_field<S: Into<String>>(mut self, field: S) -> Self {
        self.row_fields.push(field.into());
        self
    }

    pub fn add_column_field<S: Into<String>>(mut self, field: S) -> Self {
        self.column_fields.push(field.into());
        self
    }

    pub fn add_value_field<S: Into<String>>(mut self, field: S, aggregation: Aggregation) -> Self {
        self.value_fields.push(PivotValueField::new(field, aggregation));
        self
    }

    /// Add a value field with its own caption instead of "Sum of Revenue"
    pub fn add_named_value_field<S, N>(mut self, field: S, aggregation: Aggregation, name: N) -> Self
    where
        S: Into<String>,
        N: Into<String>,
    {
        let mut value = PivotValueField::new(field, aggregation);
        value.display_name = Some(name.into());
        self.value_fields.push(value);
        self
    }

    /// Build with the target sheet named in [`PivotTableBuilder::target`]
    pub fn build(self) -> Result<PivotTableSpec> {
        self.finish(None)
    }

    /// Build with `sheet` as the target sheet when the target names none
    pub(crate) fn build_on(self, sheet: &str) -> Result<PivotTableSpec> {
        self.finish(Some(sheet))
    }

    fn finish(self, default_sheet: Option<&str>) -> Result<PivotTableSpec> {
        let source_text = self
            .source
            .ok_or_else(|| Error::source_range("", format!("pivot '{}' has no source", self.name)))?;
        let source = parse_range(&source_text)?;
        if source.range.row_count() < 2 {
            return Err(Error::source_range(
                source_text,
                "needs a header row and at least one data row",
            ));
        }

        if self.value_fields.is_empty() {
            return Err(Error::Incomplete(format!(
                "pivot '{}' has no value fields",
                self.name
            )));
        }

        let (target_sheet, target_cell) = match self.target.as_deref() {
            Some(target) if target.contains('!') => {
                let target = SheetRange::parse(target)?;
                (target.sheet.clone(), target.first_cell())
            }
            Some(cell) => {
                let sheet = default_sheet.ok_or_else(|| {
                    Error::InvalidRange(format!("pivot target '{}' names no sheet", cell))
                })?;
                (sheet.to_string(), CellAddress::parse(cell)?)
            }
            None => {
                let sheet = default_sheet.ok_or_else(|| {
                    Error::InvalidRange(format!("pivot '{}' has no target", self.name))
                })?;
                (sheet.to_string(), CellAddress::new(0, 0))
            }
        };

        Ok(PivotTableSpec {
            name: self.name,
            source,
            target_sheet,
            target_cell,
            row_fields: self.row_fields,
            column_fields: self.column_fields,
            value_fields: self.value_fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn revenue_pivot() -> PivotTableBuilder {
        PivotTableBuilder::new("Revenue")
            .source("Data!A1:C10")
            .add_row_field("Region")
            .add_column_field("Month")
            .add_value_field("Revenue", Aggregation::Sum)
    }

    #[test]
    fn test_build_with_target() {
        let spec = revenue_pivot().target("'Q1 Summary'!B4").build().unwrap();
        assert_eq!(spec.target_sheet, "Q1 Summary");
        assert_eq!(spec.target_cell, CellAddress::parse("B4").unwrap());
        assert_eq!(spec.value_fields[0].caption(), "Sum of Revenue");
        assert_eq!(
            spec.referenced_fields().collect::<Vec<_>>(),
            vec!["Region", "Month", "Revenue"]
        );
    }

    #[test]
    fn test_build_on_sheet() {
        let spec = revenue_pivot().target("A3").build_on("Summary").unwrap();
        assert_eq!(spec.target_sheet, "Summary");
        assert_eq!(spec.target_cell, CellAddress::new(2, 0));
        assert!(revenue_pivot().target("A3").build().is_err());
    }

    #[test]
    fn test_invalid_sources() {
        let single_row = PivotTableBuilder::new("P")
            .source("Data!A1:C1")
            .target("Summary!A1")
            .add_value_field("Revenue", Aggregation::Sum)
            .build();
        assert!(matches!(single_row, Err(Error::InvalidSourceRange { .. })));

        let no_sheet = PivotTableBuilder::new("P")
            .source("A1:C10")
            .target("Summary!A1")
            .add_value_field("Revenue", Aggregation::Sum)
            .build();
        assert!(matches!(no_sheet, Err(Error::InvalidSourceRange { .. })));

        let no_values = PivotTableBuilder::new("P")
            .source("Data!A1:C10")
            .target("Summary!A1")
            .add_row_field("Region")
            .build();
        assert!(matches!(no_values, Err(Error::Incomplete(_))));
    }
}

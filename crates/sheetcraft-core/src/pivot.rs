//! Pivot table descriptors
//!
//! Only the layout is described here. Aggregated values are computed by the
//! spreadsheet application when the file is opened.

use crate::cell::{CellAddress, CellRange, SheetRange};
use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Summary function of a value field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Aggregation {
    #[default]
    Sum,
    Count,
    Average,
    Max,
    Min,
    Product,
}

impl Aggregation {
    /// Value of the `subtotal` attribute
    pub fn xml_name(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Count => "count",
            Aggregation::Average => "average",
            Aggregation::Max => "max",
            Aggregation::Min => "min",
            Aggregation::Product => "product",
        }
    }

    /// Label used in default captions ("Sum of Revenue")
    pub fn label(&self) -> &'static str {
        match self {
            Aggregation::Sum => "Sum",
            Aggregation::Count => "Count",
            Aggregation::Average => "Average",
            Aggregation::Max => "Max",
            Aggregation::Min => "Min",
            Aggregation::Product => "Product",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.xml_name())
    }
}

impl FromStr for Aggregation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Aggregation::Sum),
            "count" => Ok(Aggregation::Count),
            "average" | "avg" | "mean" => Ok(Aggregation::Average),
            "max" => Ok(Aggregation::Max),
            "min" => Ok(Aggregation::Min),
            "product" => Ok(Aggregation::Product),
            other => Err(Error::InvalidAggregation(other.to_string())),
        }
    }
}

/// A summarized column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PivotValueField {
    pub field: String,
    pub aggregation: Aggregation,
    pub display_name: Option<String>,
}

impl PivotValueField {
    pub fn new<S: Into<String>>(field: S, aggregation: Aggregation) -> Self {
        Self {
            field: field.into(),
            aggregation,
            display_name: None,
        }
    }

    /// Caption shown in the pivot header
    pub fn caption(&self) -> String {
        match &self.display_name {
            Some(name) => name.clone(),
            None => format!("{} of {}", self.aggregation.label(), self.field),
        }
    }
}

/// Complete pivot table configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PivotTableSpec {
    pub name: String,
    /// Data including its header row
    pub source: SheetRange,
    pub target_sheet: String,
    /// Top-left cell of the rendered table
    pub target_cell: CellAddress,
    pub row_fields: Vec<String>,
    pub column_fields: Vec<String>,
    pub value_fields: Vec<PivotValueField>,
}

impl PivotTableSpec {
    /// Header row of the source range
    pub fn header_range(&self) -> CellRange {
        let start = self.source.range.start;
        CellRange::new(start, CellAddress::new(start.row, self.source.range.end.col))
    }

    /// Every field name the layout refers to, in declaration order
    pub fn referenced_fields(&self) -> impl Iterator<Item = &str> {
        self.row_fields
            .iter()
            .chain(self.column_fields.iter())
            .map(String::as_str)
            .chain(self.value_fields.iter().map(|v| v.field.as_str()))
    }

    /// Position of `field` among `headers`, compared case-insensitively
    pub fn field_index(headers: &[String], field: &str) -> Option<usize> {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(field.trim()))
    }

    /// First referenced field missing from `headers`
    pub fn missing_field<'a>(&'a self, headers: &[String]) -> Option<&'a str> {
        self.referenced_fields()
            .find(|f| Self::field_index(headers, f).is_none())
    }
}

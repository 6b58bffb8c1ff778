//! Chart descriptors
//!
//! A [`ChartSpec`] only carries configuration; drawing the chart is left to the
//! spreadsheet application that opens the file.

use crate::cell::{CellAddress, SheetRange};

/// Chart family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChartKind {
    /// Vertical bars
    #[default]
    Column,
    /// Horizontal bars
    Bar,
    Line,
    Pie,
    Area,
    Scatter,
}

impl ChartKind {
    /// Whether the chart has category and value axes
    pub fn has_axes(&self) -> bool {
        !matches!(self, ChartKind::Pie)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Column => "column",
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Area => "area",
            ChartKind::Scatter => "scatter",
        }
    }
}

/// Where the legend is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LegendPosition {
    #[default]
    Right,
    Left,
    Top,
    Bottom,
    /// No legend
    Hidden,
}

impl LegendPosition {
    /// Value of `c:legendPos`, `None` when no legend is written
    pub fn xml_code(&self) -> Option<&'static str> {
        match self {
            LegendPosition::Right => Some("r"),
            LegendPosition::Left => Some("l"),
            LegendPosition::Top => Some("t"),
            LegendPosition::Bottom => Some("b"),
            LegendPosition::Hidden => None,
        }
    }
}

/// One data series
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartSeries {
    pub name: String,
    /// Category labels (x values for scatter charts)
    pub categories: Option<SheetRange>,
    pub values: SheetRange,
}

/// Placement of a chart on its sheet, in whole cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartAnchor {
    /// Top-left cell
    pub from: CellAddress,
    pub width_cols: u16,
    pub height_rows: u32,
}

impl ChartAnchor {
    pub const DEFAULT_WIDTH: u16 = 8;
    pub const DEFAULT_HEIGHT: u32 = 15;

    pub fn at(from: CellAddress) -> Self {
        Self {
            from,
            width_cols: Self::DEFAULT_WIDTH,
            height_rows: Self::DEFAULT_HEIGHT,
        }
    }

    /// Cell just past the bottom-right corner
    pub fn to(&self) -> CellAddress {
        CellAddress::new(
            self.from.row.saturating_add(self.height_rows),
            self.from.col.saturating_add(self.width_cols),
        )
    }
}

impl Default for ChartAnchor {
    fn default() -> Self {
        Self::at(CellAddress::new(0, 0))
    }
}

/// Complete chart configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: Option<String>,
    pub series: Vec<ChartSeries>,
    pub x_axis_title: Option<String>,
    pub y_axis_title: Option<String>,
    pub legend: LegendPosition,
    pub anchor: ChartAnchor,
}

impl ChartSpec {
    /// Sheets the series read from, in first-use order
    pub fn referenced_sheets(&self) -> Vec<&str> {
        let mut sheets: Vec<&str> = Vec::new();
        for s in &self.series {
            for r in s.categories.iter().chain(std::iter::once(&s.values)) {
                if !sheets.contains(&r.sheet.as_str()) {
                    sheets.push(&r.sheet);
                }
            }
        }
        sheets
    }
}

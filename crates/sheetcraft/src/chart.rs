//! Chart builder

use sheetcraft_core::{
    CellAddress, ChartAnchor, ChartKind, ChartSeries, ChartSpec, LegendPosition, SheetRange,
};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct SeriesDecl {
    name: String,
    categories: Option<String>,
    values: String,
}

/// Builds a [`ChartSpec`]; ranges are checked by [`ChartBuilder::build`]
///
/// ```rust
/// use sheetcraft::ChartBuilder;
/// use sheetcraft_core::ChartKind;
///
/// let chart = ChartBuilder::new(ChartKind::Line)
///     .title("Revenue by month")
///     .series_with_categories("North", "Data!A2:A13", "Data!B2:B13")
///     .anchor("E2")
///     .build()
///     .unwrap();
/// assert_eq!(chart.series.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ChartBuilder {
    kind: ChartKind,
    title: Option<String>,
    series: Vec<SeriesDecl>,
    x_axis_title: Option<String>,
    y_axis_title: Option<String>,
    legend: LegendPosition,
    anchor: String,
    size: (u16, u32),
}

impl ChartBuilder {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            title: None,
            series: Vec::new(),
            x_axis_title: None,
            y_axis_title: None,
            legend: LegendPosition::default(),
            anchor: "A1".to_string(),
            size: (ChartAnchor::DEFAULT_WIDTH, ChartAnchor::DEFAULT_HEIGHT),
        }
    }

    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a series read from `values`, e.g. `"Data!B2:B13"`
    pub fn series<N: Into<String>, V: Into<String>>(mut self, name: N, values: V) -> Self {
        self.series.push(SeriesDecl {
            name: name.into(),
            categories: None,
            values: values.into(),
        });
        self
    }

    /// Add a series with category labels (x values for scatter charts)
    pub fn series_with_categories<N, C, V>(mut self, name: N, categories: C, values: V) -> Self
    where
        N: Into<String>,
        C: Into<String>,
        V: Into<String>,
    {
        self.series.push(SeriesDecl {
            name: name.into(),
            categories: Some(categories.into()),
            values: values.into(),
        });
        self
    }

    pub fn x_axis_title<S: Into<String>>(mut self, title: S) -> Self {
        self.x_axis_title = Some(title.into());
        self
    }

    pub fn y_axis_title<S: Into<String>>(mut self, title: S) -> Self {
        self.y_axis_title = Some(title.into());
        self
    }

    pub fn legend(mut self, position: LegendPosition) -> Self {
        self.legend = position;
        self
    }

    /// Top-left cell of the chart on its sheet
    pub fn anchor<S: Into<String>>(mut self, cell: S) -> Self {
        self.anchor = cell.into();
        self
    }

    /// Size in whole columns and rows
    pub fn size(mut self, width_cols: u16, height_rows: u32) -> Self {
        self.size = (width_cols.max(1), height_rows.max(1));
        self
    }

    pub fn build(self) -> Result<ChartSpec> {
        if self.series.is_empty() {
            return Err(Error::Incomplete(format!(
                "{} chart has no series",
                self.kind.name()
            )));
        }

        let series = self
            .series
            .into_iter()
            .map(|decl| {
                Ok(ChartSeries {
                    name: decl.name,
                    categories: decl.categories.as_deref().map(parse_range).transpose()?,
                    values: parse_range(&decl.values)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let from = CellAddress::parse(&self.anchor)?;
        Ok(ChartSpec {
            kind: self.kind,
            title: self.title,
            series,
            x_axis_title: self.x_axis_title,
            y_axis_title: self.y_axis_title,
            legend: self.legend,
            anchor: ChartAnchor {
                from,
                width_cols: self.size.0,
                height_rows: self.size.1,
            },
        })
    }
}

/// Parse `Sheet!A1:B2` into a source range
pub(crate) fn parse_range(range: &str) -> Result<SheetRange> {
    SheetRange::parse(range).map_err(|e| Error::source_range(range, e.to_string()))
}

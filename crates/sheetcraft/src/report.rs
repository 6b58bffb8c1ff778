//! Parallel report assembly
//!
//! Each job computes the rows of one sheet. Jobs run on the rayon thread pool;
//! the workbook is only touched after every job has succeeded, and rows are then
//! written sequentially in job order.

use rayon::prelude::*;
use sheetcraft_core::{CellValue, SpreadsheetEngine, StyleConfig, MAX_COLS, MAX_ROWS};

use crate::builder::WorkbookBuilder;
use crate::error::{BoxError, Error, Result};

/// Rows computed by one report job
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    /// Column captions written as the first row
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RowSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows written, counting the header
    pub fn row_count(&self) -> usize {
        self.rows.len() + usize::from(self.header.is_some())
    }

    /// Widest row, counting the header
    pub fn width(&self) -> usize {
        self.header
            .iter()
            .map(Vec::len)
            .chain(self.rows.iter().map(Vec::len))
            .max()
            .unwrap_or(0)
    }

    pub fn with_header<I, S>(mut self, header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = Some(header.into_iter().map(Into::into).collect());
        self
    }

    pub fn push_row<I, V>(&mut self, row: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }
}

type Job = Box<dyn Fn() -> std::result::Result<RowSet, BoxError> + Send + Sync>;

/// Collects per-sheet jobs and writes their rows into a [`WorkbookBuilder`]
#[derive(Default)]
pub struct ReportAssembler {
    jobs: Vec<(String, Job)>,
    header_style: Option<StyleConfig>,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Style applied to every header cell
    pub fn header_style(mut self, style: StyleConfig) -> Self {
        self.header_style = Some(style);
        self
    }

    /// Add a job producing the rows of `sheet`
    pub fn job<S, F>(mut self, sheet: S, job: F) -> Self
    where
        S: Into<String>,
        F: Fn() -> std::result::Result<RowSet, BoxError> + Send + Sync + 'static,
    {
        self.jobs.push((sheet.into(), Box::new(job)));
        self
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Run every job, then append the rows to their sheets, adding sheets that
    /// do not exist yet.
    ///
    /// If any job fails, or any row set would run past the sheet limits, nothing
    /// is written and the first failure in job order is returned.
    pub fn assemble<E: SpreadsheetEngine>(self, workbook: &mut WorkbookBuilder<E>) -> Result<()> {
        for (sheet, _) in &self.jobs {
            if !workbook.has_sheet(sheet) {
                sheetcraft_core::validate_sheet_name(sheet)
                    .map_err(|e| Error::worker(sheet.as_str(), e))?;
            }
        }

        tracing::debug!(jobs = self.jobs.len(), "running report jobs");
        let results: Vec<std::result::Result<RowSet, BoxError>> =
            self.jobs.par_iter().map(|(_, job)| job()).collect();

        let mut sets = Vec::with_capacity(results.len());
        for ((sheet, _), result) in self.jobs.iter().zip(results) {
            match result {
                Ok(set) => sets.push((sheet.as_str(), set)),
                Err(e) => {
                    tracing::debug!(sheet = sheet.as_str(), error = %e, "report job failed");
                    return Err(Error::worker(sheet.as_str(), e));
                }
            }
        }

        check_fits(workbook, &sets)?;

        for (name, set) in sets {
            if !workbook.has_sheet(name) {
                workbook.add_sheet(name)?;
            }
            let mut sheet = workbook.sheet(name)?;
            if let Some(header) = &set.header {
                sheet
                    .row()?
                    .cells(header.iter().map(String::as_str), self.header_style.as_ref())?;
            }
            for values in set.rows {
                sheet.row()?.cells(values, None)?;
            }
            tracing::debug!(sheet = name, "applied report rows");
        }
        Ok(())
    }
}

/// Reject row sets that would run past the sheet limits, before anything is
/// written. Jobs targeting the same sheet add up.
fn check_fits<E: SpreadsheetEngine>(
    workbook: &WorkbookBuilder<E>,
    sets: &[(&str, RowSet)],
) -> Result<()> {
    let mut used: Vec<(&str, u64)> = Vec::new();
    for (sheet, set) in sets {
        let width = set.width();
        if width > usize::from(MAX_COLS) {
            let col = u32::try_from(width - 1).unwrap_or(u32::MAX);
            return Err(Error::worker(
                *sheet,
                sheetcraft_core::Error::ColumnOutOfBounds(col, MAX_COLS - 1),
            ));
        }

        let slot = match used.iter().position(|(s, _)| s.eq_ignore_ascii_case(sheet)) {
            Some(i) => i,
            None => {
                let start = workbook.rows_used(sheet).unwrap_or(0);
                used.push((*sheet, u64::from(start)));
                used.len() - 1
            }
        };
        let total = used[slot].1 + set.row_count() as u64;
        if total > u64::from(MAX_ROWS) {
            let row = u32::try_from(total).unwrap_or(u32::MAX);
            return Err(Error::worker(
                *sheet,
                sheetcraft_core::Error::RowOutOfBounds(row, MAX_ROWS),
            ));
        }
        used[slot].1 = total;
    }
    Ok(())
}

impl std::fmt::Debug for ReportAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportAssembler")
            .field("jobs", &self.jobs.iter().map(|(s, _)| s).collect::<Vec<_>>())
            .field("header_style", &self.header_style)
            .finish()
    }
}

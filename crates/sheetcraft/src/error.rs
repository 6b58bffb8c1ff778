//! Error types for the workbook builders

use sheetcraft_core::{CellAddress, CellRange};
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by report jobs
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while describing or building a workbook
#[derive(Debug, Error)]
pub enum Error {
    /// A sheet with the same name (ignoring case) was already added
    #[error("Sheet '{0}' already exists")]
    DuplicateSheet(String),

    /// Sheet name that was never added
    #[error("Unknown sheet: {0}")]
    UnknownSheet(String),

    /// Sheet name rejected before reaching the engine
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Range whose end lies before its start, or that cannot be parsed
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Two merged regions of one sheet share a cell
    #[error("Merged ranges {first} and {second} overlap on sheet '{sheet}'")]
    OverlappingMerge {
        sheet: String,
        first: CellRange,
        second: CellRange,
    },

    /// Row or column requested at or before a position already written
    #[error("Cannot move back to {requested}: position {current} was already used")]
    CursorRewind { requested: String, current: String },

    /// The engine refused to register a style
    #[error("Failed to register style [{style}]: {source}")]
    Registration {
        style: String,
        #[source]
        source: sheetcraft_core::Error,
    },

    /// The engine refused to apply a registered style to a cell
    #[error("Failed to apply style to {sheet}!{cell}: {source}")]
    Apply {
        sheet: String,
        cell: CellAddress,
        #[source]
        source: sheetcraft_core::Error,
    },

    /// Chart series or pivot source that is not a `Sheet!A1:B2` range
    #[error("Invalid source range '{range}': {reason}")]
    InvalidSourceRange { range: String, reason: String },

    /// Pivot field missing from the source header row
    #[error("Pivot field '{field}' not found in header row of {source_range}")]
    InvalidField { field: String, source_range: String },

    /// Chart without series or pivot table without value fields
    #[error("Incomplete definition: {0}")]
    Incomplete(String),

    /// Validation rule that cannot be written
    #[error("Invalid validation rule: {0}")]
    InvalidValidation(String),

    /// A report job failed; nothing was applied
    #[error("Report job for sheet '{sheet}' failed: {source}")]
    Worker {
        sheet: String,
        #[source]
        source: BoxError,
    },

    /// Engine failure outside style registration and application
    #[error("Engine failed to {operation}: {source}")]
    Engine {
        operation: String,
        #[source]
        source: sheetcraft_core::Error,
    },

    /// Address parsing and other core errors
    #[error(transparent)]
    Core(#[from] sheetcraft_core::Error),
}

impl Error {
    /// Wrap an engine error with the operation that failed
    pub fn engine<S: Into<String>>(operation: S, source: sheetcraft_core::Error) -> Self {
        Error::Engine {
            operation: operation.into(),
            source,
        }
    }

    pub(crate) fn worker<S: Into<String>, E: Into<BoxError>>(sheet: S, source: E) -> Self {
        Error::Worker {
            sheet: sheet.into(),
            source: source.into(),
        }
    }

    pub(crate) fn source_range<R: Into<String>, S: Into<String>>(range: R, reason: S) -> Self {
        Error::InvalidSourceRange {
            range: range.into(),
            reason: reason.into(),
        }
    }
}

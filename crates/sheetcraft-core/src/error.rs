//! Error types for sheetcraft-core and the engine boundary

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by core parsing and by [`crate::SpreadsheetEngine`] implementations
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u32, u16),

    /// Sheet index out of bounds
    #[error("Sheet index {0} out of bounds (count: {1})")]
    SheetOutOfBounds(usize, usize),

    /// Sheet not found by name
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Invalid sheet name
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Duplicate sheet name
    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),

    /// Malformed number format code
    #[error("Invalid number format '{code}': {reason}")]
    InvalidNumberFormat { code: String, reason: String },

    /// Style description the engine cannot represent
    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    /// Style id that was never registered with the engine
    #[error("Unknown style id: {0}")]
    UnknownStyle(u32),

    /// Pivot field missing from the source header row
    #[error("Field '{field}' not found in header row of {source_range}")]
    FieldNotFound { field: String, source_range: String },

    /// Aggregation name that is not one of the supported summary functions
    #[error("Unknown aggregation: {0}")]
    InvalidAggregation(String),

    /// Merged region conflicts with an existing one
    #[error("Merged range {0} overlaps an existing merged range")]
    MergedCellConflict(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure inside a backing engine that has no closer variant
    #[error("Engine error: {0}")]
    Backend(String),
}

impl Error {
    /// Create a backend error with a message
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Error::Backend(msg.into())
    }
}

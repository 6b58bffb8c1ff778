//! # sheetcraft-xlsx
//!
//! An in-memory [`SpreadsheetEngine`](sheetcraft_core::SpreadsheetEngine) that
//! saves to and reopens from XLSX (Office Open XML) packages.
//!
//! ```rust,no_run
//! use sheetcraft_core::{CellAddress, CellValue, SpreadsheetEngine, StyleConfig};
//! use sheetcraft_xlsx::XlsxEngine;
//!
//! let mut engine = XlsxEngine::new();
//! engine.create_sheet("Report").unwrap();
//! let a1 = CellAddress::parse("A1").unwrap();
//! engine.set_cell_value("Report", a1, CellValue::from("Revenue")).unwrap();
//! let bold = engine.register_style(&StyleConfig::new().bold(true)).unwrap();
//! engine.set_cell_style("Report", a1, bold).unwrap();
//! engine.save_as("report.xlsx".as_ref()).unwrap();
//! ```

pub mod engine;
pub mod error;
pub mod options;
pub mod reader;
pub mod writer;

mod styles;

pub use engine::{Cell, PivotEntry, Worksheet, XlsxEngine};
pub use error::{XlsxError, XlsxResult};
pub use options::{CompressionLevel, SaveOptions};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;

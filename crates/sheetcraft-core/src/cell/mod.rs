//! Cell addressing and values

mod address;
mod sheet_range;
mod value;

pub use address::{CellAddress, CellRange, Cells};
pub use sheet_range::SheetRange;
pub use value::CellValue;

pub mod classify;
pub mod error;
pub mod headers;
pub mod table;

pub use classify::{ClassifiedRow, Multiplicity, RowKind, classify_row, classify_type_cell};
pub use error::{IngestError, Result};
pub use headers::HeaderConfig;
pub use table::{Row, SheetTable, read_table, read_table_from_reader};

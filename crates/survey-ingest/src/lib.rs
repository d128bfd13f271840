//! Tabular file I/O for survey response tables.
//!
//! - `.csv` comma separated, `.txt`/`.tsv` tab separated
//! - `.xlsx`/`.xls`/`.xlsm`/`.ods`: first worksheet, first row as header
//!
//! Everything is read into a polars `DataFrame`.

pub mod error;
pub mod format;
pub mod reader;
pub mod source;
pub mod writer;

pub use error::{IngestError, Result};
pub use format::TableFormat;
pub use reader::{read_response_table, read_table, read_table_with_missing, require_columns};
pub use source::{FileResponseSource, ResponseSource, survey_by_selection};
pub use writer::write_csv;

//! Error types for survey data ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing response tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read or write a file.
    #[error("failed to access file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extension does not name a supported table format.
    #[error("unsupported file format '{extension}' for {path} (expected .csv, .txt, .tsv, .xlsx or .xls)")]
    UnsupportedFormat { path: PathBuf, extension: String },

    // === Parsing Errors ===
    /// Failed to parse a delimited file with Polars.
    #[error("failed to parse {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Failed to write a delimited file.
    #[error("failed to write {path}: {message}")]
    CsvWrite { path: PathBuf, message: String },

    /// Failed to open or read a workbook.
    #[error("failed to read spreadsheet {path}: {message}")]
    Spreadsheet { path: PathBuf, message: String },

    /// Workbook has no worksheet or the first worksheet has no header row.
    #[error("spreadsheet has no data: {path}")]
    EmptySheet { path: PathBuf },

    // === Schema Errors ===
    /// Required columns absent from an input table.
    #[error("{table} is missing required columns: {}", columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    // === Source Errors ===
    /// No rows for the requested survey.
    #[error("survey not found: {survey}")]
    SurveyNotFound { survey: String },

    /// Menu selection outside `1..=available`.
    #[error("invalid selection {selection}, choose a number between 1 and {available}")]
    InvalidSelection { selection: usize, available: usize },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::MissingColumns {
            table: "responses".to_string(),
            columns: vec!["answer".to_string(), "person_id".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "responses is missing required columns: answer, person_id"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}

//! Error types for the transformation stages.

use survey_ingest::IngestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// Required columns absent from the input table. Raised before any work starts.
    #[error("{operation} requires missing columns: {}", columns.join(", "))]
    MissingColumns {
        operation: &'static str,
        columns: Vec<String>,
    },

    /// Re-enumeration ran past `i64::MAX`.
    #[error("no integer question ids left above {max}")]
    QuestionIdOverflow { max: i64 },

    #[error("scale '{score_name}' has no variables")]
    NoVariables { score_name: String },

    /// Loading a recode input file failed (including unsupported formats).
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("normalization worker for partition {partition} panicked")]
    WorkerPanicked { partition: usize },

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;

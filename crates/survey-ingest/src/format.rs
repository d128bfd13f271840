use std::path::Path;

use crate::error::{IngestError, Result};

/// Table format inferred from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// `.csv`
    Comma,
    /// `.txt`, `.tsv`
    Tab,
    /// `.xlsx`, `.xlsm`, `.xls`, `.ods`
    Spreadsheet,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(Self::Comma),
            "txt" | "tsv" => Ok(Self::Tab),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(Self::Spreadsheet),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }

    /// Field separator for delimited formats.
    pub fn separator(self) -> Option<u8> {
        match self {
            Self::Comma => Some(b','),
            Self::Tab => Some(b'\t'),
            Self::Spreadsheet => None,
        }
    }
}

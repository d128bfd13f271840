use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How each record of a normalization pass was resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationStats {
    pub records: usize,
    /// Resolved through the fixed sentinel table.
    pub sentinel: usize,
    /// Resolved (numeric, text or both) through the reference key.
    pub reference: usize,
    /// Raw digit answers with no answer concept id.
    pub numeric_fallback: usize,
    /// Neither value resolved.
    pub unmapped: usize,
}

impl NormalizationStats {
    /// Adds the counts of another pass, e.g. one partition of a parallel run.
    pub fn merge(&mut self, other: &NormalizationStats) {
        self.records += other.records;
        self.sentinel += other.sentinel;
        self.reference += other.reference;
        self.numeric_fallback += other.numeric_fallback;
        self.unmapped += other.unmapped;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputPaths {
    pub normalized: Option<PathBuf>,
    pub pivot_numeric: Option<PathBuf>,
    pub pivot_text: Option<PathBuf>,
    pub codebook: Option<PathBuf>,
}

/// Written next to the result files of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub created_at: DateTime<Utc>,
    pub input: PathBuf,
    pub survey: Option<String>,
    /// sha256 of the reference key the run resolved against.
    pub reference_sha256: String,
    pub input_rows: usize,
    pub output_rows: usize,
    pub persons: usize,
    pub questions: usize,
    pub normalization: NormalizationStats,
    pub outputs: OutputPaths,
}

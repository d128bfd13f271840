//! Composite scale definitions and their diagnostic summary.

use serde::{Deserialize, Serialize};

use crate::options::{Aggregation, CompletenessMode};

/// Share of items that must be valid under [`CompletenessMode::Partial`].
pub const PARTIAL_COMPLETENESS_THRESHOLD: f64 = 0.8;

/// A composite score over a set of wide-table columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleSpec {
    /// Wide-table columns to aggregate, e.g. `["q43528662", "q43528663"]`.
    pub variables: Vec<String>,
    /// Name of the score column added to the table.
    pub score_name: String,
    pub completeness: CompletenessMode,
    pub aggregation: Aggregation,
}

impl ScaleSpec {
    pub fn new<I, S>(variables: I, score_name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variables: variables.into_iter().map(Into::into).collect(),
            score_name: score_name.into(),
            completeness: CompletenessMode::default(),
            aggregation: Aggregation::default(),
        }
    }

    #[must_use]
    pub fn with_completeness(mut self, completeness: CompletenessMode) -> Self {
        self.completeness = completeness;
        self
    }

    #[must_use]
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Minimum number of valid items a row needs to be scored.
    pub fn required_valid(&self) -> usize {
        match self.completeness {
            CompletenessMode::Strict => self.variables.len(),
            // ceil(0.8 * n) computed in integers to avoid float edge cases
            CompletenessMode::Partial => (self.variables.len() * 4).div_ceil(5),
        }
    }
}

/// Diagnostic output of a scoring run. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleSummary {
    pub score_name: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Rows of the merged table left without a score.
    pub missing: usize,
    /// Rows of the merged table that received a score.
    pub scored: usize,
}

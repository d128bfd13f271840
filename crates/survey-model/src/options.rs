//! Configuration options for the response pipeline stages.

use serde::{Deserialize, Serialize};

use crate::columns::{ANSWER_NUMERIC, ANSWER_TEXT};

/// How a select-all-that-apply row gets its synthetic question id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectAllPolicy {
    /// `"<question>_<answer>"`, readable and stable across runs.
    #[default]
    Composite,
    /// A fresh integer per distinct composite key, allocated above the
    /// largest integer question id in the table.
    Reenumerate,
}

/// Options for the multi-select expansion stage.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ExpandOptions {
    pub policy: SelectAllPolicy,
}

impl ExpandOptions {
    pub fn new(policy: SelectAllPolicy) -> Self {
        Self { policy }
    }
}

/// What the recoder does with list-valued cells.
///
/// Single-element lists always collapse to their element. The policies only
/// differ on empty and multi-element lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListCellPolicy {
    /// Leave empty and multi-element lists alone. A column holding any of
    /// them keeps its list type, since a typed column cannot mix scalars and lists.
    #[default]
    Preserve,
    /// Empty and multi-element lists become missing; the column always
    /// collapses to its element type.
    Strict,
}

/// Options for the missing-value recoder.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RecodeOptions {
    pub list_policy: ListCellPolicy,
    /// Force `answer_numeric` to Float64, turning unparseable values into missing.
    pub coerce_numeric: bool,
}

impl RecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stricter variant: numeric coercion plus [`ListCellPolicy::Strict`].
    pub fn strict() -> Self {
        Self {
            list_policy: ListCellPolicy::Strict,
            coerce_numeric: true,
        }
    }

    #[must_use]
    pub fn with_list_policy(mut self, policy: ListCellPolicy) -> Self {
        self.list_policy = policy;
        self
    }

    #[must_use]
    pub fn with_coerce_numeric(mut self, enable: bool) -> Self {
        self.coerce_numeric = enable;
        self
    }
}

/// Which resolved value the reshaper spreads into the wide table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotValue {
    Numeric,
    Text,
}

impl PivotValue {
    pub fn column(self) -> &'static str {
        match self {
            PivotValue::Numeric => ANSWER_NUMERIC,
            PivotValue::Text => ANSWER_TEXT,
        }
    }

    /// Default file name of the persisted wide table.
    pub fn file_name(self) -> &'static str {
        match self {
            PivotValue::Numeric => "pivot_n.csv",
            PivotValue::Text => "pivot_t.csv",
        }
    }
}

/// Which rows of a wide table are eligible for a scale score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompletenessMode {
    /// Every item present and non-negative.
    #[default]
    Strict,
    /// At least 80% of the items present and non-negative.
    Partial,
}

/// How item values combine into a scale score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Aggregation {
    #[default]
    Sum,
    Mean,
}

impl Aggregation {
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let sum: f64 = values.iter().sum();
        match self {
            Aggregation::Sum => Some(sum),
            Aggregation::Mean => Some(sum / values.len() as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_recode_enables_everything() {
        let options = RecodeOptions::strict();
        assert_eq!(options.list_policy, ListCellPolicy::Strict);
        assert!(options.coerce_numeric);
        assert_eq!(RecodeOptions::new().list_policy, ListCellPolicy::Preserve);
    }

    #[test]
    fn aggregation_over_values() {
        assert_eq!(Aggregation::Sum.apply(&[1.0, 2.0, 3.0]), Some(6.0));
        assert_eq!(Aggregation::Mean.apply(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(Aggregation::Mean.apply(&[]), None);
    }

    #[test]
    fn pivot_value_targets() {
        assert_eq!(PivotValue::Numeric.column(), "answer_numeric");
        assert_eq!(PivotValue::Text.file_name(), "pivot_t.csv");
    }
}

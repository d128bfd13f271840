//! Small DataFrame helpers shared by the stages.

use polars::prelude::*;
use survey_common::{any_to_i64, any_to_string_non_empty};

use crate::error::{Result, TransformError};

pub(crate) fn require_columns(
    df: &DataFrame,
    operation: &'static str,
    columns: &[&str],
) -> Result<()> {
    let missing: Vec<String> = columns
        .iter()
        .filter(|column| df.get_column_index(column).is_none())
        .map(|column| (*column).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(TransformError::MissingColumns {
            operation,
            columns: missing,
        })
    }
}

pub(crate) fn filter_rows(df: &DataFrame, mask: &[bool]) -> Result<DataFrame> {
    Ok(df.filter(&BooleanChunked::from_slice("mask".into(), mask))?)
}

/// Question ids as strings: integral values print without a fraction
/// (`1585889.0` -> `"1585889"`), anything else is kept as written.
pub(crate) fn question_ids(column: &Column) -> Vec<Option<String>> {
    (0..column.len())
        .map(|idx| {
            let value = column.get(idx).unwrap_or(AnyValue::Null);
            match any_to_i64(value.clone()) {
                Some(id) => Some(id.to_string()),
                None => any_to_string_non_empty(value).map(|s| s.trim().to_string()),
            }
        })
        .collect()
}

//! Scale Scorer.

use std::collections::HashMap;

use polars::prelude::*;
use survey_common::{column_f64s, column_i64s};
use survey_model::columns::PERSON_ID;
use survey_model::{ScaleSpec, ScaleSummary};
use tracing::info;

use crate::error::{Result, TransformError};
use crate::frame::require_columns;

/// Adds `spec.score_name` to a wide table.
///
/// A value counts as valid when present and non-negative; negative values
/// are coded-missing answers that survived reshaping. A row is scored when
/// it has at least [`ScaleSpec::required_valid`] valid items, aggregating
/// over the valid items only. Scores are attached by `person_id` so every
/// row of the input is kept and unscored persons get a null.
pub fn score(wide: &DataFrame, spec: &ScaleSpec) -> Result<DataFrame> {
    score_with_summary(wide, spec).map(|(df, _)| df)
}

/// [`score`] plus min, max and counts of the new column.
pub fn score_with_summary(wide: &DataFrame, spec: &ScaleSpec) -> Result<(DataFrame, ScaleSummary)> {
    if spec.variables.is_empty() {
        return Err(TransformError::NoVariables {
            score_name: spec.score_name.clone(),
        });
    }
    let mut required: Vec<&str> = vec![PERSON_ID];
    required.extend(spec.variables.iter().map(String::as_str));
    require_columns(wide, "score", &required)?;

    let items = spec
        .variables
        .iter()
        .map(|name| wide.column(name).map(column_f64s))
        .collect::<PolarsResult<Vec<_>>>()?;
    let min_valid = spec.required_valid();

    let row_scores: Vec<Option<f64>> = (0..wide.height())
        .map(|row| {
            let valid: Vec<f64> = items
                .iter()
                .filter_map(|item| item[row])
                .filter(|v| *v >= 0.0)
                .collect();
            if valid.len() >= min_valid {
                spec.aggregation.apply(&valid)
            } else {
                None
            }
        })
        .collect();

    // Left join on person_id: the first row of a person supplies its score.
    let persons = column_i64s(wide.column(PERSON_ID)?);
    let mut by_person: HashMap<i64, Option<f64>> = HashMap::new();
    for (person, score) in persons.iter().zip(&row_scores) {
        if let Some(person) = person {
            by_person.entry(*person).or_insert(*score);
        }
    }
    let scores: Vec<Option<f64>> = persons
        .iter()
        .zip(&row_scores)
        .map(|(person, own)| match person {
            Some(person) => by_person.get(person).copied().flatten(),
            None => *own,
        })
        .collect();

    let summary = summarize(&spec.score_name, &scores);
    let mut out = wide.clone();
    out.with_column(Column::new(spec.score_name.as_str().into(), scores))?;

    info!(
        score = %summary.score_name,
        min = ?summary.min,
        max = ?summary.max,
        missing = summary.missing,
        scored = summary.scored,
        "scale scored"
    );
    Ok((out, summary))
}

fn summarize(score_name: &str, scores: &[Option<f64>]) -> ScaleSummary {
    let present: Vec<f64> = scores.iter().flatten().copied().collect();
    ScaleSummary {
        score_name: score_name.to_string(),
        min: present.iter().copied().reduce(f64::min),
        max: present.iter().copied().reduce(f64::max),
        missing: scores.len() - present.len(),
        scored: present.len(),
    }
}

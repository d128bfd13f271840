//! Multi-Select Expander.
//!
//! Rows answering a select-all question get a synthetic question id built
//! from the question and the selected option, so every option becomes its
//! own column after pivoting. Other rows keep their question id.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;
use survey_common::{column_i64s, parse_i64};
use survey_model::columns::{ANSWER_CONCEPT_ID, QUESTION_CONCEPT_ID};
use survey_model::{ExpandOptions, SelectAllPolicy};
use tracing::{debug, info};

use crate::error::{Result, TransformError};
use crate::frame::{filter_rows, question_ids, require_columns};

/// Expands select-all rows.
///
/// The output holds the untouched rows first and the expanded rows after
/// them, each group in input order. `question_concept_id` is returned as a
/// string column under either policy.
pub fn expand(
    responses: &DataFrame,
    select_all_questions: &BTreeSet<i64>,
    options: ExpandOptions,
) -> Result<DataFrame> {
    expand_with_allocations(responses, select_all_questions, options).map(|(df, _)| df)
}

/// [`expand`] plus the composite-key to integer-id cache used by
/// [`SelectAllPolicy::Reenumerate`] (empty under the composite policy).
pub fn expand_with_allocations(
    responses: &DataFrame,
    select_all_questions: &BTreeSet<i64>,
    options: ExpandOptions,
) -> Result<(DataFrame, BTreeMap<String, i64>)> {
    require_columns(responses, "expand", &[QUESTION_CONCEPT_ID, ANSWER_CONCEPT_ID])?;

    let questions = question_ids(responses.column(QUESTION_CONCEPT_ID)?);
    let answers = column_i64s(responses.column(ANSWER_CONCEPT_ID)?);

    // A select-all row without an answer id has no option to split out.
    let composite_keys: Vec<Option<String>> = questions
        .iter()
        .zip(&answers)
        .map(|(question, answer)| {
            let question = question.as_deref()?;
            let answer = (*answer)?;
            let id = parse_i64(question)?;
            select_all_questions
                .contains(&id)
                .then(|| format!("{id}_{answer}"))
        })
        .collect();
    let selected: Vec<bool> = composite_keys.iter().map(Option::is_some).collect();

    let mut base = responses.clone();
    base.with_column(Column::new(QUESTION_CONCEPT_ID.into(), questions.clone()))?;

    let expanded_count = selected.iter().filter(|s| **s).count();
    if expanded_count == 0 {
        debug!("no select-all rows to expand");
        return Ok((base, BTreeMap::new()));
    }

    let mut allocations = BTreeMap::new();
    let new_ids: Vec<String> = match options.policy {
        SelectAllPolicy::Composite => composite_keys.into_iter().flatten().collect(),
        SelectAllPolicy::Reenumerate => {
            let max = questions
                .iter()
                .flatten()
                .filter_map(|q| parse_i64(q))
                .max();
            let mut next = match max {
                Some(max) => max.checked_add(1),
                None => Some(1),
            };
            let mut ids = Vec::with_capacity(expanded_count);
            for key in composite_keys.into_iter().flatten() {
                let id = match allocations.get(&key) {
                    Some(id) => *id,
                    None => {
                        let id = next.ok_or(TransformError::QuestionIdOverflow {
                            max: max.unwrap_or_default(),
                        })?;
                        next = id.checked_add(1);
                        allocations.insert(key, id);
                        id
                    }
                };
                ids.push(id.to_string());
            }
            ids
        }
    };

    let unchanged_mask: Vec<bool> = selected.iter().map(|s| !s).collect();
    let mut output = filter_rows(&base, &unchanged_mask)?;
    let mut exploded = filter_rows(&base, &selected)?;
    exploded.with_column(Column::new(QUESTION_CONCEPT_ID.into(), new_ids))?;
    output.vstack_mut(&exploded)?;

    info!(
        rows = output.height(),
        expanded = expanded_count,
        policy = ?options.policy,
        allocated = allocations.len(),
        "select-all responses expanded"
    );
    Ok((output, allocations))
}

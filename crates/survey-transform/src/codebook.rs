//! Codebook table: the distinct question/answer combinations of a response table.

use std::collections::HashSet;

use polars::prelude::*;
use survey_common::column_strings;
use survey_model::columns::{
    ANSWER, ANSWER_CONCEPT_ID, ANSWER_NUMERIC, ANSWER_TEXT, QUESTION, QUESTION_CONCEPT_ID,
};
use tracing::info;

use crate::error::Result;
use crate::frame::{filter_rows, require_columns};

const CODEBOOK_COLUMNS: [&str; 6] = [
    QUESTION_CONCEPT_ID,
    QUESTION,
    ANSWER_CONCEPT_ID,
    ANSWER,
    ANSWER_TEXT,
    ANSWER_NUMERIC,
];

/// Distinct combinations of the codebook columns present in `responses`,
/// in order of first appearance.
///
/// `question_concept_id` and `question` are required; the answer columns
/// are included when present.
pub fn build_codebook(responses: &DataFrame) -> Result<DataFrame> {
    require_columns(responses, "codebook", &[QUESTION_CONCEPT_ID, QUESTION])?;

    let present: Vec<&str> = CODEBOOK_COLUMNS
        .into_iter()
        .filter(|name| responses.get_column_index(name).is_some())
        .collect();
    let columns = present
        .iter()
        .map(|name| responses.column(name).map(column_strings))
        .collect::<PolarsResult<Vec<_>>>()?;

    let mut seen = HashSet::new();
    let mask: Vec<bool> = (0..responses.height())
        .map(|row| {
            let key: Vec<Option<&str>> = columns.iter().map(|c| c[row].as_deref()).collect();
            seen.insert(key)
        })
        .collect();

    let codebook = filter_rows(&responses.select(present.iter().copied())?, &mask)?;
    info!(
        entries = codebook.height(),
        columns = codebook.width(),
        "codebook built"
    );
    Ok(codebook)
}

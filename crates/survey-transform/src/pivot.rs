//! Reshaper: long to wide.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use polars::prelude::*;
use survey_common::{any_to_f64, any_to_string_non_empty, column_i64s};
use survey_model::PivotValue;
use survey_model::columns::{PERSON_ID, QUESTION_CONCEPT_ID, question_column};
use tracing::{info, warn};

use crate::error::Result;
use crate::frame::{question_ids, require_columns};

#[derive(Debug, Clone)]
enum Cell {
    Numeric(f64),
    Text(String),
}

/// Pivots a long table to one row per `person_id` and one `q<question>` column per question.
///
/// Duplicate (person, question) pairs keep the first non-missing value in
/// input row order. Persons are sorted ascending and every person in the
/// input gets a row, even when all of its values are missing. Rows without
/// a person id or question id are skipped.
pub fn pivot(long: &DataFrame, value: PivotValue) -> Result<DataFrame> {
    let value_column = value.column();
    require_columns(long, "pivot", &[PERSON_ID, QUESTION_CONCEPT_ID, value_column])?;

    let persons = column_i64s(long.column(PERSON_ID)?);
    let questions = question_ids(long.column(QUESTION_CONCEPT_ID)?);
    let values = long.column(value_column)?;

    let mut person_set = BTreeSet::new();
    let mut question_set = BTreeSet::new();
    let mut cells: HashMap<(i64, &str), Cell> = HashMap::new();
    let mut skipped = 0usize;

    for (idx, (person, question)) in persons.iter().zip(&questions).enumerate() {
        let (Some(person), Some(question)) = (person, question.as_deref()) else {
            skipped += 1;
            continue;
        };
        person_set.insert(*person);
        question_set.insert(QuestionKey(question));

        let raw = values.get(idx)?;
        let cell = match value {
            PivotValue::Numeric => any_to_f64(raw).map(Cell::Numeric),
            PivotValue::Text => any_to_string_non_empty(raw).map(Cell::Text),
        };
        if let Some(cell) = cell {
            cells.entry((*person, question)).or_insert(cell);
        }
    }
    if skipped > 0 {
        warn!(skipped, "rows without person or question id left out of the wide table");
    }

    let persons: Vec<i64> = person_set.into_iter().collect();
    let mut columns: Vec<Column> = Vec::with_capacity(question_set.len() + 1);
    columns.push(Column::new(PERSON_ID.into(), persons.clone()));
    for QuestionKey(question) in &question_set {
        let name = question_column(question);
        let column = match value {
            PivotValue::Numeric => {
                let values: Vec<Option<f64>> = persons
                    .iter()
                    .map(|person| match cells.get(&(*person, *question)) {
                        Some(Cell::Numeric(v)) => Some(*v),
                        _ => None,
                    })
                    .collect();
                Column::new(name.into(), values)
            }
            PivotValue::Text => {
                let values: Vec<Option<String>> = persons
                    .iter()
                    .map(|person| match cells.get(&(*person, *question)) {
                        Some(Cell::Text(v)) => Some(v.clone()),
                        _ => None,
                    })
                    .collect();
                Column::new(name.into(), values)
            }
        };
        columns.push(column);
    }

    let wide = DataFrame::new(columns)?;
    info!(
        persons = wide.height(),
        questions = question_set.len(),
        value = value_column,
        "responses pivoted"
    );
    Ok(wide)
}

/// Orders question ids naturally: `"2" < "10" < "10_3" < "10_20" < "abc"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QuestionKey<'a>(&'a str);

impl Ord for QuestionKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut left = self.0.split('_');
        let mut right = other.0.split('_');
        loop {
            match (left.next(), right.next()) {
                (None, None) => return self.0.cmp(other.0),
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(a), Some(b)) => {
                    let ordering = match (a.parse::<i64>(), b.parse::<i64>()) {
                        (Ok(x), Ok(y)) => x.cmp(&y),
                        (Ok(_), Err(_)) => Ordering::Less,
                        (Err(_), Ok(_)) => Ordering::Greater,
                        (Err(_), Err(_)) => a.cmp(b),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
            }
        }
    }
}

impl PartialOrd for QuestionKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

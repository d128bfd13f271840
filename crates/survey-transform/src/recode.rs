//! Missing-Value Recoder.
//!
//! Coded-missing values (`-999..=-980`) become nulls in every column and
//! list-valued cells are flattened according to [`ListCellPolicy`]. A column
//! that stays a list has its coded-missing elements nulled in place.
//! Recoding is idempotent.

use std::path::Path;

use polars::prelude::*;
use survey_common::{column_f64s, column_i64s, column_strings};
use survey_ingest::read_table_with_missing;
use survey_model::columns::ANSWER_NUMERIC;
use survey_model::{ListCellPolicy, RecodeOptions};
use survey_standards::MissingSentinelRange;
use tracing::{debug, info};

use crate::error::Result;

/// The two accepted input shapes.
#[derive(Debug, Clone, Copy)]
pub enum RecodeInput<'a> {
    Table(&'a DataFrame),
    /// Loaded with the sentinel literals registered as null values.
    File(&'a Path),
}

impl<'a> From<&'a DataFrame> for RecodeInput<'a> {
    fn from(df: &'a DataFrame) -> Self {
        Self::Table(df)
    }
}

impl<'a> From<&'a Path> for RecodeInput<'a> {
    fn from(path: &'a Path) -> Self {
        Self::File(path)
    }
}

pub fn recode<'a>(input: impl Into<RecodeInput<'a>>, options: RecodeOptions) -> Result<DataFrame> {
    let literals = MissingSentinelRange::literals();
    let mut df = match input.into() {
        RecodeInput::Table(df) => df.clone(),
        RecodeInput::File(path) => read_table_with_missing(path, &literals)?,
    };

    let names: Vec<PlSmallStr> = df.get_column_names_owned();
    let mut recoded = 0usize;
    for name in &names {
        let column = df.column(name.as_str())?;
        let flattened = match column.dtype() {
            DataType::List(_) => flatten_lists(column, options.list_policy)?,
            _ => None,
        };
        let current = flattened.as_ref().unwrap_or(column);
        let replaced = match current.dtype() {
            DataType::List(_) => replace_list_sentinels(current, &literals)?,
            _ => replace_sentinels(current, &literals)?,
        };
        let updated = match replaced {
            Some((column, count)) => {
                recoded += count;
                Some(column)
            }
            None => flattened,
        };
        if let Some(column) = updated {
            df.with_column(column)?;
        }
    }

    if options.coerce_numeric && df.get_column_index(ANSWER_NUMERIC).is_some() {
        let values = column_f64s(df.column(ANSWER_NUMERIC)?);
        df.with_column(Column::new(ANSWER_NUMERIC.into(), values))?;
        debug!("answer_numeric coerced to Float64");
    }

    info!(
        rows = df.height(),
        recoded,
        policy = ?options.list_policy,
        "missing values recoded"
    );
    Ok(df)
}

/// Nulls out coded-missing cells. Returns `None` when nothing changed.
fn replace_sentinels(column: &Column, literals: &[String]) -> Result<Option<(Column, usize)>> {
    let dtype = column.dtype().clone();
    let name = column.name().clone();
    let (values, count) = if dtype.is_integer() {
        let values = column_i64s(column);
        let count = values
            .iter()
            .flatten()
            .filter(|v| MissingSentinelRange::contains_i64(**v))
            .count();
        let values: Vec<Option<i64>> = values
            .into_iter()
            .map(|v| v.filter(|v| !MissingSentinelRange::contains_i64(*v)))
            .collect();
        (Series::new(name, values), count)
    } else if dtype.is_float() {
        let values = column_f64s(column);
        let count = values
            .iter()
            .flatten()
            .filter(|v| MissingSentinelRange::contains_f64(**v))
            .count();
        let values: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| v.filter(|v| !MissingSentinelRange::contains_f64(*v)))
            .collect();
        (Series::new(name, values), count)
    } else if dtype == DataType::String {
        let values = column_strings(column);
        let is_code = |v: &String| literals.iter().any(|l| l == v.trim());
        let count = values.iter().flatten().filter(|v| is_code(v)).count();
        let values: Vec<Option<String>> = values
            .into_iter()
            .map(|v| v.filter(|v| !is_code(v)))
            .collect();
        (Series::new(name, values), count)
    } else {
        return Ok(None);
    };
    if count == 0 {
        return Ok(None);
    }
    Ok(Some((values.cast(&dtype)?.into_column(), count)))
}

/// Nulls coded-missing elements inside the cells of a list column.
fn replace_list_sentinels(column: &Column, literals: &[String]) -> Result<Option<(Column, usize)>> {
    let mut total = 0usize;
    let mut cells: Vec<AnyValue<'static>> = Vec::with_capacity(column.len());
    for idx in 0..column.len() {
        match column.get(idx)? {
            AnyValue::List(cell) => match replace_sentinels(&cell.clone().into_column(), literals)? {
                Some((replaced, count)) => {
                    total += count;
                    cells.push(AnyValue::List(replaced.as_materialized_series().clone()));
                }
                None => cells.push(AnyValue::List(cell)),
            },
            _ => cells.push(AnyValue::Null),
        }
    }
    if total == 0 {
        return Ok(None);
    }
    let series =
        Series::from_any_values(column.name().clone(), &cells, false)?.cast(column.dtype())?;
    Ok(Some((series.into_column(), total)))
}

/// Unwraps single-element list cells.
///
/// Returns `None` when the column must stay a list: under
/// [`ListCellPolicy::Preserve`] any empty or multi-element cell keeps the
/// whole column a list, singletons included. Coded-missing elements inside
/// such a column are still nulled by [`replace_list_sentinels`].
fn flatten_lists(column: &Column, policy: ListCellPolicy) -> Result<Option<Column>> {
    let DataType::List(inner) = column.dtype() else {
        return Ok(None);
    };
    let inner = inner.as_ref().clone();

    let mut values: Vec<AnyValue<'static>> = Vec::with_capacity(column.len());
    for idx in 0..column.len() {
        match column.get(idx)? {
            AnyValue::List(cell) if cell.len() == 1 => values.push(owned_value(cell.get(0)?)),
            AnyValue::List(_) => match policy {
                ListCellPolicy::Preserve => return Ok(None),
                ListCellPolicy::Strict => values.push(AnyValue::Null),
            },
            _ => values.push(AnyValue::Null),
        }
    }

    let series = Series::from_any_values(column.name().clone(), &values, false)?.cast(&inner)?;
    debug!(column = %column.name(), "list cells flattened");
    Ok(Some(series.into_column()))
}

fn owned_value(value: AnyValue<'_>) -> AnyValue<'static> {
    match value {
        AnyValue::Null => AnyValue::Null,
        AnyValue::Boolean(v) => AnyValue::Boolean(v),
        AnyValue::Int8(v) => AnyValue::Int8(v),
        AnyValue::Int16(v) => AnyValue::Int16(v),
        AnyValue::Int32(v) => AnyValue::Int32(v),
        AnyValue::Int64(v) => AnyValue::Int64(v),
        AnyValue::UInt8(v) => AnyValue::UInt8(v),
        AnyValue::UInt16(v) => AnyValue::UInt16(v),
        AnyValue::UInt32(v) => AnyValue::UInt32(v),
        AnyValue::UInt64(v) => AnyValue::UInt64(v),
        AnyValue::Float32(v) => AnyValue::Float32(v),
        AnyValue::Float64(v) => AnyValue::Float64(v),
        AnyValue::String(s) => AnyValue::StringOwned(s.into()),
        AnyValue::StringOwned(s) => AnyValue::StringOwned(s),
        other => AnyValue::StringOwned(other.to_string().into()),
    }
}

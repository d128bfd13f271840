//! Readers for delimited and spreadsheet tables.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use polars::prelude::*;
use survey_common::{column_f64s, format_numeric, parse_f64};
use survey_model::columns::{ANSWER_CONCEPT_ID, PERSON_ID};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::format::TableFormat;

/// Reads a table, inferring column types from the whole file.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    read_with(path, &[], false)
}

/// Reads a table, treating every cell equal to one of `missing_literals` as null.
///
/// The substitution happens in the loader and applies to every column.
pub fn read_table_with_missing(path: &Path, missing_literals: &[String]) -> Result<DataFrame> {
    read_with(path, missing_literals, false)
}

/// Reads a long-format response export.
///
/// Every column is kept as text so answers such as `"007"` survive intact;
/// `person_id` and `answer_concept_id` are then cast to integers when every
/// present value is numeric.
pub fn read_response_table(path: &Path) -> Result<DataFrame> {
    let mut df = read_with(path, &[], true)?;
    for name in [PERSON_ID, ANSWER_CONCEPT_ID] {
        if df.get_column_index(name).is_none() {
            continue;
        }
        let raw = df.column(name)?;
        let floats = raw.cast(&DataType::Float64)?;
        let integral = floats.null_count() == raw.null_count()
            && column_f64s(&floats)
                .into_iter()
                .flatten()
                .all(|v| v.fract() == 0.0);
        // Non-integer ids stay text rather than turning into nulls.
        if !integral {
            debug!(column = name, "non-integer ids kept as text");
            continue;
        }
        let column = floats.cast(&DataType::Int64)?;
        df.with_column(column)?;
    }
    debug!(path = %path.display(), rows = df.height(), "response table loaded");
    Ok(df)
}

/// Fails with [`IngestError::MissingColumns`] unless every column is present.
pub fn require_columns(df: &DataFrame, table: &str, columns: &[&str]) -> Result<()> {
    let missing: Vec<String> = columns
        .iter()
        .filter(|column| df.get_column_index(column).is_none())
        .map(|column| (*column).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::MissingColumns {
            table: table.to_string(),
            columns: missing,
        })
    }
}

fn read_with(path: &Path, missing_literals: &[String], all_text: bool) -> Result<DataFrame> {
    let format = TableFormat::from_path(path)?;
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let df = match format.separator() {
        Some(separator) => read_delimited(path, separator, missing_literals, all_text)?,
        None => read_spreadsheet(path, missing_literals, all_text)?,
    };
    debug!(
        path = %path.display(),
        format = ?format,
        rows = df.height(),
        columns = df.width(),
        "table loaded"
    );
    Ok(df)
}

fn read_delimited(
    path: &Path,
    separator: u8,
    missing_literals: &[String],
    all_text: bool,
) -> Result<DataFrame> {
    let null_values = if missing_literals.is_empty() {
        None
    } else {
        Some(NullValues::AllColumns(
            missing_literals.iter().map(|s| s.as_str().into()).collect(),
        ))
    };
    // 0 reads every column as String; None scans the whole file.
    let infer_length = if all_text { Some(0) } else { None };

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_length)
        .map_parse_options(|opts| {
            opts.with_separator(separator)
                .with_null_values(null_values.clone())
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

fn read_spreadsheet(path: &Path, missing_literals: &[String], all_text: bool) -> Result<DataFrame> {
    let spreadsheet_error = |message: String| IngestError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };
    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::EmptySheet {
            path: path.to_path_buf(),
        })?
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Err(IngestError::EmptySheet {
            path: path.to_path_buf(),
        });
    };
    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| cell_text(cell).unwrap_or_else(|| format!("column_{}", idx + 1)))
        .collect();

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (idx, column) in values.iter_mut().enumerate() {
            let cell = row
                .get(idx)
                .and_then(cell_text)
                .filter(|text| !missing_literals.contains(text));
            column.push(cell);
        }
    }

    let columns = names
        .into_iter()
        .zip(values)
        .map(|(name, cells)| {
            if all_text {
                Column::new(name.into(), cells)
            } else {
                infer_column(name, cells)
            }
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()).filter(|s| !s.trim().is_empty()),
        Data::Float(v) => Some(format_numeric(*v)),
        Data::Int(v) => Some(v.to_string()),
        Data::Bool(v) => Some(v.to_string()),
        other => Some(other.to_string()),
    }
}

/// Int64 when every present cell is an integer, Float64 when every present
/// cell is numeric, String otherwise.
fn infer_column(name: String, cells: Vec<Option<String>>) -> Column {
    let present = || cells.iter().flatten();
    if present().all(|v| v.parse::<i64>().is_ok()) {
        let ints: Vec<Option<i64>> = cells
            .iter()
            .map(|v| v.as_deref().and_then(|v| v.parse().ok()))
            .collect();
        return Column::new(name.into(), ints);
    }
    if present().all(|v| parse_f64(v).is_some()) {
        let floats: Vec<Option<f64>> = cells.iter().map(|v| v.as_deref().and_then(parse_f64)).collect();
        return Column::new(name.into(), floats);
    }
    Column::new(name.into(), cells)
}

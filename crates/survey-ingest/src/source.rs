//! Where raw response tables come from.
//!
//! The warehouse query that produces a survey export lives outside this
//! workspace; [`ResponseSource`] is the seam it plugs into.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use survey_common::{column_i64s, column_strings};
use survey_model::columns::{PERSON_ID, RAW_RESPONSE_COLUMNS, SURVEY};
use tracing::info;

use crate::error::{IngestError, Result};
use crate::reader::{read_response_table, require_columns};

/// A provider of long-format survey responses.
pub trait ResponseSource {
    /// Survey instrument names, in a stable order.
    fn surveys(&self) -> Result<Vec<String>>;

    /// Distinct response rows of one survey with the raw response columns.
    fn fetch(&self, survey: &str) -> Result<DataFrame>;
}

/// Resolves a 1-based menu number against [`ResponseSource::surveys`].
pub fn survey_by_selection<S>(source: &S, selection: usize) -> Result<String>
where
    S: ResponseSource + ?Sized,
{
    let surveys = source.surveys()?;
    let available = surveys.len();
    selection
        .checked_sub(1)
        .and_then(|idx| surveys.into_iter().nth(idx))
        .ok_or(IngestError::InvalidSelection {
            selection,
            available,
        })
}

/// A response export already on disk, holding many surveys.
#[derive(Debug, Clone)]
pub struct FileResponseSource {
    path: Option<PathBuf>,
    table: DataFrame,
}

impl FileResponseSource {
    pub fn open(path: &Path) -> Result<Self> {
        let table = read_response_table(path)?;
        let mut source = Self::from_table(table)?;
        source.path = Some(path.to_path_buf());
        Ok(source)
    }

    pub fn from_table(table: DataFrame) -> Result<Self> {
        require_columns(&table, "response export", &RAW_RESPONSE_COLUMNS)?;
        Ok(Self { path: None, table })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl ResponseSource for FileResponseSource {
    fn surveys(&self) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let surveys = column_strings(self.table.column(SURVEY)?)
            .into_iter()
            .flatten()
            .filter(|name| seen.insert(name.clone()))
            .collect();
        Ok(surveys)
    }

    fn fetch(&self, survey: &str) -> Result<DataFrame> {
        let names = column_strings(self.table.column(SURVEY)?);
        let columns = RAW_RESPONSE_COLUMNS
            .iter()
            .map(|name| self.table.column(name).map(column_strings))
            .collect::<PolarsResult<Vec<_>>>()?;

        let mut seen = HashSet::new();
        let mask: Vec<bool> = (0..self.table.height())
            .map(|row| {
                if names[row].as_deref() != Some(survey) {
                    return false;
                }
                let key: Vec<Option<&str>> =
                    columns.iter().map(|column| column[row].as_deref()).collect();
                seen.insert(key)
            })
            .collect();
        if !mask.contains(&true) {
            return Err(IngestError::SurveyNotFound {
                survey: survey.to_string(),
            });
        }

        let selected = self
            .table
            .select(RAW_RESPONSE_COLUMNS)?
            .filter(&BooleanChunked::from_slice("mask".into(), &mask))?;
        let persons: HashSet<i64> = column_i64s(selected.column(PERSON_ID)?)
            .into_iter()
            .flatten()
            .collect();
        info!(
            survey,
            rows = selected.height(),
            persons = persons.len(),
            "survey responses fetched"
        );
        Ok(selected)
    }
}

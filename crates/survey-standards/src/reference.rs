//! Reference Key Store: the packaged answer code key.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::{debug, info};

use crate::error::{Result, StandardsError};
use crate::paths::default_reference_key_path;

const KEY_COLUMNS: [&str; 5] = [
    "question_concept_id",
    "answer_concept_id",
    "answer_numeric",
    "answer_text",
    "select_all",
];

/// One row of the reference key table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceEntry {
    pub question_concept_id: i64,
    pub answer_concept_id: i64,
    pub answer_numeric: Option<f64>,
    pub answer_text: Option<String>,
    pub select_all: bool,
}

/// Immutable two-level index over the reference key.
///
/// Lookups are keyed by question first, so an answer id shared by several
/// questions resolves per question and misses under any other question.
#[derive(Debug, Clone, Default)]
pub struct ReferenceKey {
    numeric: HashMap<i64, HashMap<i64, f64>>,
    text: HashMap<i64, HashMap<i64, String>>,
    select_all: BTreeSet<i64>,
    rows: usize,
    source: Option<PathBuf>,
}

impl ReferenceKey {
    /// Builds the indices. Text values are trimmed once here; a later row
    /// for the same (question, answer) pair replaces an earlier one.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ReferenceEntry>,
    {
        let mut key = Self::default();
        for entry in entries {
            key.rows += 1;
            let q = entry.question_concept_id;
            let a = entry.answer_concept_id;
            if let Some(value) = entry.answer_numeric {
                key.numeric.entry(q).or_default().insert(a, value);
            }
            if let Some(text) = entry.answer_text {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    key.text.entry(q).or_default().insert(a, trimmed.to_string());
                }
            }
            if entry.select_all {
                key.select_all.insert(q);
            }
        }
        key
    }

    pub fn numeric(&self, question: i64, answer: i64) -> Option<f64> {
        self.numeric.get(&question)?.get(&answer).copied()
    }

    pub fn text(&self, question: i64, answer: i64) -> Option<&str> {
        self.text.get(&question)?.get(&answer).map(String::as_str)
    }

    pub fn is_select_all(&self, question: i64) -> bool {
        self.select_all.contains(&question)
    }

    /// Question ids flagged `select_all == 1`.
    pub fn select_all_questions(&self) -> &BTreeSet<i64> {
        &self.select_all
    }

    /// Number of rows the key was built from.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// File the key was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Load the reference key from the packaged (or overridden) reference directory.
pub fn load_default_reference_key() -> Result<ReferenceKey> {
    load_reference_key(&default_reference_key_path())
}

/// Load a reference key table from a CSV file.
///
/// Fails with [`StandardsError::MissingResource`] when the file is absent.
pub fn load_reference_key(path: &Path) -> Result<ReferenceKey> {
    if !path.exists() {
        return Err(StandardsError::MissingResource {
            path: path.to_path_buf(),
        });
    }
    let rows = read_csv_rows(path)?;

    let mut entries = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for row in &rows {
        let question = parse_id(field(row, "question_concept_id"));
        let answer = parse_id(field(row, "answer_concept_id"));
        let (Some(question_concept_id), Some(answer_concept_id)) = (question, answer) else {
            skipped += 1;
            continue;
        };
        entries.push(ReferenceEntry {
            question_concept_id,
            answer_concept_id,
            answer_numeric: field(row, "answer_numeric").parse::<f64>().ok(),
            answer_text: Some(field(row, "answer_text").to_string()).filter(|t| !t.is_empty()),
            select_all: parse_flag(field(row, "select_all")),
        });
    }
    if skipped > 0 {
        debug!(path = %path.display(), skipped, "skipped reference rows without ids");
    }

    let mut key = ReferenceKey::from_entries(entries);
    key.source = Some(path.to_path_buf());
    info!(
        path = %path.display(),
        rows = key.len(),
        select_all_questions = key.select_all.len(),
        "reference key loaded"
    );
    Ok(key)
}

fn read_csv_rows(path: &Path) -> Result<Vec<BTreeMap<String, String>>> {
    let csv_error = |e: csv::Error| StandardsError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(csv_error)?;

    let headers = reader.headers().map_err(csv_error)?.clone();
    let missing = KEY_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h.trim_matches('\u{feff}').trim() == **column));
    if let Some(column) = missing {
        return Err(StandardsError::MissingColumn {
            column: (*column).to_string(),
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let mut row = BTreeMap::new();
        for (idx, value) in record.iter().enumerate() {
            let key = headers
                .get(idx)
                .unwrap_or("")
                .trim_matches('\u{feff}')
                .trim()
                .to_string();
            row.insert(key, value.trim().to_string());
        }
        rows.push(row);
    }
    Ok(rows)
}

fn field<'a>(row: &'a BTreeMap<String, String>, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or("")
}

fn parse_id(value: &str) -> Option<i64> {
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().filter(|v| v.fract() == 0.0).map(|v| v as i64))
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "1.0" | "true" | "yes")
}

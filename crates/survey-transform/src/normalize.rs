//! Answer Normalizer.
//!
//! Each record resolves to an `(answer_numeric, answer_text)` pair:
//!
//! 1. a sentinel answer id wins outright, under any question;
//! 2. otherwise numeric and text are looked up in the reference key
//!    independently, keyed by (question, answer);
//! 3. a record with no answer id whose raw answer is all digits takes the
//!    raw answer as both values, overriding steps 1 and 2.
//!
//! Unmatched records keep `(null, null)`. Text output is always a string.

use polars::prelude::*;
use survey_common::{any_is_missing, any_to_i64, any_to_string_non_empty, is_all_digits};
use survey_model::NormalizationStats;
use survey_model::columns::{
    ANSWER, ANSWER_CONCEPT_ID, ANSWER_NUMERIC, ANSWER_TEXT, QUESTION_CONCEPT_ID,
};
use survey_standards::{ReferenceKey, SentinelTable};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::frame::{question_ids, require_columns};

const REQUIRED: [&str; 3] = [QUESTION_CONCEPT_ID, ANSWER_CONCEPT_ID, ANSWER];

/// Which rule produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Sentinel,
    Reference,
    NumericFallback,
    Unmapped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAnswer {
    pub numeric: Option<f64>,
    pub text: Option<String>,
    pub source: ResolutionSource,
}

/// Resolves single records against a reference key and sentinel table.
///
/// Holds shared borrows only, so one resolver can serve several threads.
#[derive(Debug, Clone, Copy)]
pub struct AnswerResolver<'a> {
    key: &'a ReferenceKey,
    sentinels: &'a SentinelTable,
}

impl<'a> AnswerResolver<'a> {
    pub fn new(key: &'a ReferenceKey, sentinels: &'a SentinelTable) -> Self {
        Self { key, sentinels }
    }

    pub fn key(&self) -> &'a ReferenceKey {
        self.key
    }

    pub fn resolve(
        &self,
        question_concept_id: Option<i64>,
        answer_concept_id: Option<i64>,
        answer: Option<&str>,
    ) -> ResolvedAnswer {
        let mut resolved = self.lookup(question_concept_id, answer_concept_id);

        if answer_concept_id.is_none()
            && let Some(raw) = answer.filter(|raw| is_all_digits(raw))
        {
            resolved = ResolvedAnswer {
                numeric: raw.parse::<f64>().ok(),
                text: Some(raw.to_string()),
                source: ResolutionSource::NumericFallback,
            };
        }
        resolved
    }

    /// [`Self::resolve`] over a raw `answer_concept_id` cell.
    ///
    /// Only a missing cell counts as an absent id. A present id that is not
    /// an integer (`"PMI_Skip"`, `903087.5`) matches nothing and never takes
    /// the raw-digit fallback.
    pub fn resolve_cell(
        &self,
        question_concept_id: Option<i64>,
        answer_concept_id: AnyValue<'_>,
        answer: Option<&str>,
    ) -> ResolvedAnswer {
        if any_is_missing(&answer_concept_id) {
            return self.resolve(question_concept_id, None, answer);
        }
        match any_to_i64(answer_concept_id) {
            Some(id) => self.resolve(question_concept_id, Some(id), answer),
            None => unmapped(),
        }
    }

    fn lookup(&self, question: Option<i64>, answer: Option<i64>) -> ResolvedAnswer {
        let Some(answer) = answer else {
            return unmapped();
        };
        if let Some(sentinel) = self.sentinels.get(answer) {
            return ResolvedAnswer {
                numeric: Some(sentinel.numeric),
                text: Some(sentinel.text.to_string()),
                source: ResolutionSource::Sentinel,
            };
        }
        let Some(question) = question else {
            return unmapped();
        };
        let numeric = self.key.numeric(question, answer);
        let text = self.key.text(question, answer).map(str::to_string);
        if numeric.is_none() && text.is_none() {
            return unmapped();
        }
        ResolvedAnswer {
            numeric,
            text,
            source: ResolutionSource::Reference,
        }
    }
}

fn unmapped() -> ResolvedAnswer {
    ResolvedAnswer {
        numeric: None,
        text: None,
        source: ResolutionSource::Unmapped,
    }
}

/// Adds (or overwrites) `answer_numeric` and `answer_text`.
///
/// `question_concept_id` comes back as a string column so later stages can
/// embed synthetic ids. All other columns pass through unchanged.
pub fn normalize(responses: &DataFrame, resolver: &AnswerResolver<'_>) -> Result<DataFrame> {
    normalize_with_stats(responses, resolver).map(|(df, _)| df)
}

/// [`normalize`] plus a count of records per resolution rule.
pub fn normalize_with_stats(
    responses: &DataFrame,
    resolver: &AnswerResolver<'_>,
) -> Result<(DataFrame, NormalizationStats)> {
    require_columns(responses, "normalize", &REQUIRED)?;

    let question_column = responses.column(QUESTION_CONCEPT_ID)?;
    let questions = question_ids(question_column);
    let answer_ids = responses.column(ANSWER_CONCEPT_ID)?;
    let answers = responses.column(ANSWER)?;

    let height = responses.height();
    let mut numeric: Vec<Option<f64>> = Vec::with_capacity(height);
    let mut text: Vec<Option<String>> = Vec::with_capacity(height);
    let mut stats = NormalizationStats {
        records: height,
        ..NormalizationStats::default()
    };

    for idx in 0..height {
        let question = question_column.get(idx).ok().and_then(any_to_i64);
        let raw = answers.get(idx).ok().and_then(any_to_string_non_empty);
        let answer_id = answer_ids.get(idx).unwrap_or(AnyValue::Null);
        let resolved = resolver.resolve_cell(question, answer_id, raw.as_deref());
        match resolved.source {
            ResolutionSource::Sentinel => stats.sentinel += 1,
            ResolutionSource::Reference => stats.reference += 1,
            ResolutionSource::NumericFallback => stats.numeric_fallback += 1,
            ResolutionSource::Unmapped => stats.unmapped += 1,
        }
        numeric.push(resolved.numeric);
        text.push(resolved.text);
    }

    let mut out = responses.clone();
    out.with_column(Column::new(QUESTION_CONCEPT_ID.into(), questions))?;
    out.with_column(Column::new(ANSWER_NUMERIC.into(), numeric))?;
    out.with_column(Column::new(ANSWER_TEXT.into(), text))?;

    debug!(
        records = stats.records,
        sentinel = stats.sentinel,
        reference = stats.reference,
        numeric_fallback = stats.numeric_fallback,
        "answers resolved"
    );
    if stats.unmapped > 0 {
        warn!(unmapped = stats.unmapped, "answers without a matching code");
    }
    info!(records = stats.records, "normalization complete");
    Ok((out, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_standards::ReferenceEntry;

    fn key() -> ReferenceKey {
        ReferenceKey::from_entries([ReferenceEntry {
            question_concept_id: 1,
            answer_concept_id: 100,
            answer_numeric: Some(2.0),
            answer_text: Some("  Two ".to_string()),
            select_all: false,
        }])
    }

    #[test]
    fn sentinel_beats_reference_key() {
        let key = ReferenceKey::from_entries([ReferenceEntry {
            question_concept_id: 1,
            answer_concept_id: 903096,
            answer_numeric: Some(7.0),
            answer_text: Some("Seven".to_string()),
            select_all: false,
        }]);
        let sentinels = SentinelTable::standard();
        let resolved = AnswerResolver::new(&key, &sentinels).resolve(Some(1), Some(903096), None);
        assert_eq!(resolved.numeric, Some(-998.0));
        assert_eq!(resolved.text.as_deref(), Some("Skip"));
        assert_eq!(resolved.source, ResolutionSource::Sentinel);
    }

    #[test]
    fn reference_text_comes_back_trimmed() {
        let key = key();
        let sentinels = SentinelTable::standard();
        let resolved = AnswerResolver::new(&key, &sentinels).resolve(Some(1), Some(100), Some("x"));
        assert_eq!(resolved.numeric, Some(2.0));
        assert_eq!(resolved.text.as_deref(), Some("Two"));
    }

    #[test]
    fn digit_fallback_needs_a_null_answer_id() {
        let key = key();
        let sentinels = SentinelTable::standard();
        let resolver = AnswerResolver::new(&key, &sentinels);
        let fallback = resolver.resolve(Some(1), None, Some("42"));
        assert_eq!(fallback.numeric, Some(42.0));
        assert_eq!(fallback.text.as_deref(), Some("42"));

        let with_id = resolver.resolve(Some(1), Some(555), Some("42"));
        assert_eq!(with_id.source, ResolutionSource::Unmapped);

        let signed = resolver.resolve(Some(1), None, Some("-4"));
        assert_eq!(signed.source, ResolutionSource::Unmapped);
    }
}

//! Tests for the answer normalizer.

mod common;

use polars::prelude::*;
use survey_common::{column_f64s, column_strings};
use survey_standards::{ReferenceEntry, ReferenceKey, SENTINEL_CODES};
use survey_transform::{
    AnswerResolver, ResolutionSource, TransformError, normalize, normalize_with_stats,
};

#[test]
fn sentinel_and_digit_rows_resolve() {
    let key = common::reference_key();
    let sentinels = common::sentinels();
    let resolver = AnswerResolver::new(&key, &sentinels);
    let responses = df!(
        "person_id" => [10i64, 10],
        "question_concept_id" => [1i64, 2],
        "answer_concept_id" => [Some(903087i64), None],
        "answer" => [None::<&str>, Some("5")],
    )
    .expect("frame");

    let normalized = normalize(&responses, &resolver).expect("normalize");
    assert_eq!(
        column_f64s(normalized.column("answer_numeric").expect("numeric")),
        vec![Some(-999.0), Some(5.0)]
    );
    assert_eq!(
        column_strings(normalized.column("answer_text").expect("text")),
        vec![Some("Don't Know".to_string()), Some("5".to_string())]
    );
}

#[test]
fn output_types_are_fixed() {
    let key = common::reference_key();
    let sentinels = common::sentinels();
    let resolver = AnswerResolver::new(&key, &sentinels);
    let normalized = normalize(&common::raw_responses(), &resolver).expect("normalize");
    let dtype = |name: &str| normalized.column(name).expect(name).dtype().clone();
    assert_eq!(dtype("question_concept_id"), DataType::String);
    assert_eq!(dtype("answer_numeric"), DataType::Float64);
    assert_eq!(dtype("answer_text"), DataType::String);
    assert_eq!(normalized.height(), 8);
    assert_eq!(
        column_strings(normalized.column("question").expect("question")),
        column_strings(common::raw_responses().column("question").expect("question"))
    );
}

#[test]
fn every_sentinel_wins_under_any_question() {
    let key = common::reference_key();
    let sentinels = common::sentinels();
    let resolver = AnswerResolver::new(&key, &sentinels);
    for (question, &(answer, numeric, text)) in [1585889i64, 43528662, 999].iter().cycle().zip(SENTINEL_CODES) {
        let resolved = resolver.resolve(Some(*question), Some(answer), Some("raw"));
        assert_eq!(resolved.numeric, Some(numeric), "sentinel {answer}");
        assert_eq!(resolved.text.as_deref(), Some(text), "sentinel {answer}");
        assert_eq!(resolved.source, ResolutionSource::Sentinel);
    }
}

#[test]
fn reference_pairs_resolve_exactly() {
    let key = common::reference_key();
    let sentinels = common::sentinels();
    let resolver = AnswerResolver::new(&key, &sentinels);
    let cases = [
        (1585889, 1585890, 1.0, "Yes"),
        (1585940, 1585942, 2.0, "Very Good"),
        (43528664, 43529100, 3.0, "Never"),
        (43528662, 43529100, 1.0, "Never"),
    ];
    for (question, answer, numeric, text) in cases {
        let resolved = resolver.resolve(Some(question), Some(answer), None);
        assert_eq!(resolved.numeric, Some(numeric));
        assert_eq!(resolved.text.as_deref(), Some(text));
        assert_eq!(resolved.source, ResolutionSource::Reference);
    }
}

#[test]
fn lookup_under_wrong_question_misses() {
    let key = common::reference_key();
    let sentinels = common::sentinels();
    let resolver = AnswerResolver::new(&key, &sentinels);
    let resolved = resolver.resolve(Some(1585889), Some(43529100), Some("Never"));
    assert_eq!(resolved.numeric, None);
    assert_eq!(resolved.text, None);
    assert_eq!(resolved.source, ResolutionSource::Unmapped);
}

#[test]
fn text_only_key_rows_and_digit_answers() {
    let key = ReferenceKey::from_entries([ReferenceEntry {
        question_concept_id: 5,
        answer_concept_id: 50,
        answer_numeric: None,
        answer_text: Some("Fifty".to_string()),
        select_all: false,
    }]);
    let sentinels = common::sentinels();
    let resolver = AnswerResolver::new(&key, &sentinels);

    let responses = df!(
        "question_concept_id" => [5i64, 5, 5],
        "answer_concept_id" => [Some(50i64), None, None],
        "answer" => [Some("7"), Some("0012"), Some("12 years")],
    )
    .expect("frame");
    let (normalized, stats) = normalize_with_stats(&responses, &resolver).expect("normalize");
    assert_eq!(
        column_f64s(normalized.column("answer_numeric").expect("numeric")),
        vec![None, Some(12.0), None]
    );
    assert_eq!(
        column_strings(normalized.column("answer_text").expect("text")),
        vec![Some("Fifty".to_string()), Some("0012".to_string()), None]
    );
    assert_eq!(stats.reference, 1);
    assert_eq!(stats.numeric_fallback, 1);
    assert_eq!(stats.unmapped, 1);
}

#[test]
fn existing_answer_columns_are_overwritten() {
    let key = common::reference_key();
    let sentinels = common::sentinels();
    let resolver = AnswerResolver::new(&key, &sentinels);
    let responses = df!(
        "question_concept_id" => ["1585889"],
        "answer_concept_id" => [1585891i64],
        "answer" => ["No"],
        "answer_numeric" => [123i64],
        "answer_text" => [456i64],
    )
    .expect("frame");
    let normalized = normalize(&responses, &resolver).expect("normalize");
    assert_eq!(normalized.width(), 5);
    assert_eq!(
        column_f64s(normalized.column("answer_numeric").expect("numeric")),
        vec![Some(0.0)]
    );
    assert_eq!(
        column_strings(normalized.column("answer_text").expect("text")),
        vec![Some("No".to_string())]
    );
}

#[test]
fn float_typed_ids_still_resolve() {
    let key = common::reference_key();
    let sentinels = common::sentinels();
    let resolver = AnswerResolver::new(&key, &sentinels);
    let responses = df!(
        "question_concept_id" => [1585889.0f64],
        "answer_concept_id" => [Some(1585890.0f64)],
        "answer" => ["Yes"],
    )
    .expect("frame");
    let normalized = normalize(&responses, &resolver).expect("normalize");
    assert_eq!(
        column_strings(normalized.column("question_concept_id").expect("question")),
        vec![Some("1585889".to_string())]
    );
    assert_eq!(
        column_f64s(normalized.column("answer_numeric").expect("numeric")),
        vec![Some(1.0)]
    );
}

#[test]
fn present_but_non_integer_ids_skip_the_digit_fallback() {
    let key = common::reference_key();
    let sentinels = common::sentinels();
    let resolver = AnswerResolver::new(&key, &sentinels);
    let responses = df!(
        "question_concept_id" => [1585900i64, 1585900, 1585900],
        "answer_concept_id" => [Some("PMI_Skip"), Some("903087.5"), None],
        "answer" => ["5", "7", "9"],
    )
    .expect("frame");

    let (normalized, stats) = normalize_with_stats(&responses, &resolver).expect("normalize");

    assert_eq!(
        column_f64s(normalized.column("answer_numeric").expect("numeric")),
        vec![None, None, Some(9.0)]
    );
    assert_eq!(
        column_strings(normalized.column("answer_text").expect("text")),
        vec![None, None, Some("9".to_string())]
    );
    assert_eq!(stats.unmapped, 2);
    assert_eq!(stats.numeric_fallback, 1);

    let float_id = resolver.resolve_cell(Some(1585900), AnyValue::Float64(903087.5), Some("7"));
    assert_eq!(float_id.source, ResolutionSource::Unmapped);
    let nan_id = resolver.resolve_cell(Some(1585900), AnyValue::Float64(f64::NAN), Some("7"));
    assert_eq!(nan_id.source, ResolutionSource::NumericFallback);
}

#[test]
fn missing_columns_fail_before_work() {
    let key = common::reference_key();
    let sentinels = common::sentinels();
    let resolver = AnswerResolver::new(&key, &sentinels);
    let responses = df!("question_concept_id" => [1i64]).expect("frame");
    match normalize(&responses, &resolver) {
        Err(TransformError::MissingColumns { operation, columns }) => {
            assert_eq!(operation, "normalize");
            assert_eq!(columns, vec!["answer_concept_id", "answer"]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

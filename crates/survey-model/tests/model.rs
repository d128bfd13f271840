//! Tests for survey-model types.

use chrono::Utc;
use survey_model::columns::{QUESTION_COLUMN_PREFIX, question_column};
use survey_model::{NormalizationStats, OutputPaths, RunManifest, ScaleSpec};

#[test]
fn question_columns_are_prefixed() {
    assert_eq!(QUESTION_COLUMN_PREFIX, 'q');
    assert_eq!(question_column("43528662"), "q43528662");
    assert_eq!(question_column("1585_1586"), "q1585_1586");
}

#[test]
fn stats_merge_adds_counts() {
    let mut total = NormalizationStats {
        records: 3,
        sentinel: 1,
        reference: 1,
        numeric_fallback: 0,
        unmapped: 1,
    };
    total.merge(&NormalizationStats {
        records: 2,
        sentinel: 0,
        reference: 1,
        numeric_fallback: 1,
        unmapped: 0,
    });
    assert_eq!(total.records, 5);
    assert_eq!(total.reference, 2);
    assert_eq!(total.numeric_fallback, 1);
    assert_eq!(total.unmapped, 1);
}

#[test]
fn manifest_serializes() {
    let manifest = RunManifest {
        created_at: Utc::now(),
        input: "responses.csv".into(),
        survey: Some("The Basics".to_string()),
        reference_sha256: "abc".to_string(),
        input_rows: 10,
        output_rows: 12,
        persons: 3,
        questions: 4,
        normalization: NormalizationStats::default(),
        outputs: OutputPaths {
            pivot_numeric: Some("out/pivot_n.csv".into()),
            ..OutputPaths::default()
        },
    };
    let json = serde_json::to_string(&manifest).expect("serialize manifest");
    let round: RunManifest = serde_json::from_str(&json).expect("deserialize manifest");
    assert_eq!(round.survey.as_deref(), Some("The Basics"));
    assert_eq!(round.output_rows, 12);
    assert_eq!(
        round.outputs.pivot_numeric.as_deref(),
        Some(std::path::Path::new("out/pivot_n.csv"))
    );
}

#[test]
fn scale_spec_builder() {
    let spec = ScaleSpec::new(vec!["q1".to_string(), "q2".to_string()], "total");
    assert_eq!(spec.variables, vec!["q1", "q2"]);
    assert_eq!(spec.score_name, "total");
}

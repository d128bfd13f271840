//! End-to-end tests for the staged pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use survey_cli::pipeline::{
    MANIFEST_FILE, PipelineConfig, SurveyFilter, ingest, reference_key_path, run_pipeline,
};
use survey_common::column_f64s;
use survey_ingest::read_table;
use survey_model::{ExpandOptions, RunManifest, SelectAllPolicy};
use survey_standards::REFERENCE_KEY_FILE;
use tempfile::TempDir;

const EXPORT: &str = "\
person_id,survey,question_concept_id,question,answer_concept_id,answer
10,The Basics,1585889,Smoke?,1585890,Yes
10,The Basics,1585940,Health?,903087,
10,The Basics,1586140,Race?,1586141,White
10,The Basics,1586140,Race?,1586143,Asian
11,The Basics,1585889,Smoke?,1585891,No
11,The Basics,1585900,Age?,,42
11,The Basics,1586140,Race?,1586146,Other
";

fn write_export(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn numeric_cell(path: &Path, column: &str, row: usize) -> Option<f64> {
    let wide = read_table(path).unwrap();
    column_f64s(wide.column(column).unwrap())[row]
}

#[test]
fn run_writes_wide_tables_and_manifest() {
    let dir = TempDir::new().unwrap();
    let input = write_export(dir.path(), "responses.csv", EXPORT);
    let output_dir = dir.path().join("out");
    let mut config = PipelineConfig::new(&input, &output_dir);
    config.write_codebook = true;

    let result = run_pipeline(&config).unwrap();

    let text = fs::read_to_string(output_dir.join("pivot_t.csv")).unwrap();
    insta::assert_snapshot!(text.trim_end(), @r"
    person_id,q1585889,q1585900,q1585940,q1586140_1586141,q1586140_1586143,q1586140_1586146
    10,Yes,,Don't Know,White,Asian,
    11,No,42,,,,Other
    ");

    let numeric = output_dir.join("pivot_n.csv");
    assert_eq!(numeric_cell(&numeric, "q1585889", 0), Some(1.0));
    assert_eq!(numeric_cell(&numeric, "q1585889", 1), Some(0.0));
    assert_eq!(numeric_cell(&numeric, "q1585900", 1), Some(42.0));
    // -999 recoded to missing
    assert_eq!(numeric_cell(&numeric, "q1585940", 0), None);
    assert_eq!(numeric_cell(&numeric, "q1586140_1586141", 0), Some(1.0));
    assert_eq!(numeric_cell(&numeric, "q1586140_1586143", 0), Some(3.0));
    assert_eq!(numeric_cell(&numeric, "q1586140_1586146", 1), Some(4.0));

    assert_eq!(result.stats.records, 7);
    assert_eq!(result.stats.sentinel, 1);
    assert_eq!(result.stats.reference, 5);
    assert_eq!(result.stats.numeric_fallback, 1);
    assert_eq!(result.stats.unmapped, 0);

    let manifest: RunManifest =
        serde_json::from_str(&fs::read_to_string(output_dir.join(MANIFEST_FILE)).unwrap())
            .unwrap();
    assert_eq!(manifest.input_rows, 7);
    assert_eq!(manifest.output_rows, 7);
    assert_eq!(manifest.persons, 2);
    assert_eq!(manifest.questions, 6);
    assert_eq!(manifest.reference_sha256.len(), 64);
    assert!(manifest.survey.is_none());
    assert_eq!(manifest.outputs.codebook, Some(output_dir.join("codebook.csv")));
    assert!(output_dir.join("codebook.csv").exists());
    assert!(manifest.outputs.normalized.is_none());
}

#[test]
fn run_without_expansion_keeps_one_column_per_question() {
    let dir = TempDir::new().unwrap();
    let input = write_export(dir.path(), "responses.csv", EXPORT);
    let output_dir = dir.path().join("out");
    let mut config = PipelineConfig::new(&input, &output_dir);
    config.expand = None;

    let result = run_pipeline(&config).unwrap();

    assert_eq!(result.manifest.questions, 4);
    let text = fs::read_to_string(output_dir.join("pivot_t.csv")).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(header, "person_id,q1585889,q1585900,q1585940,q1586140");
    // first selected option wins
    assert!(text.lines().nth(1).unwrap().ends_with(",White"));
}

#[test]
fn reenumerated_ids_sit_above_existing_questions() {
    let dir = TempDir::new().unwrap();
    let input = write_export(dir.path(), "responses.csv", EXPORT);
    let output_dir = dir.path().join("out");
    let mut config = PipelineConfig::new(&input, &output_dir);
    config.expand = Some(ExpandOptions::new(SelectAllPolicy::Reenumerate));

    run_pipeline(&config).unwrap();

    let text = fs::read_to_string(output_dir.join("pivot_t.csv")).unwrap();
    assert_eq!(
        text.lines().next().unwrap(),
        "person_id,q1585889,q1585900,q1585940,q1586141,q1586142,q1586143"
    );
}

#[test]
fn survey_selection_narrows_the_export() {
    let dir = TempDir::new().unwrap();
    let mut contents = EXPORT.to_string();
    contents.push_str("12,Lifestyle,1585889,Smoke?,1585890,Yes\n");
    contents.push_str("12,Lifestyle,1585889,Smoke?,1585890,Yes\n");
    let input = write_export(dir.path(), "responses.csv", &contents);

    let (table, survey) = ingest(&input, &SurveyFilter::Selection(2)).unwrap();
    assert_eq!(survey.as_deref(), Some("Lifestyle"));
    // duplicate rows collapse
    assert_eq!(table.height(), 1);

    let output_dir = dir.path().join("out");
    let mut config = PipelineConfig::new(&input, &output_dir);
    config.survey = SurveyFilter::Name("The Basics".to_string());
    let result = run_pipeline(&config).unwrap();
    assert_eq!(result.manifest.persons, 2);
    assert_eq!(result.manifest.survey.as_deref(), Some("The Basics"));

    assert!(ingest(&input, &SurveyFilter::Selection(3)).is_err());
}

#[test]
fn tab_delimited_exports_are_accepted() {
    let dir = TempDir::new().unwrap();
    let input = write_export(dir.path(), "responses.txt", &EXPORT.replace(',', "\t"));
    let output_dir = dir.path().join("out");

    let result = run_pipeline(&PipelineConfig::new(&input, &output_dir)).unwrap();

    assert_eq!(result.manifest.persons, 2);
    assert!(output_dir.join("pivot_n.csv").exists());
}

#[test]
fn missing_columns_fail_the_run() {
    let dir = TempDir::new().unwrap();
    let input = write_export(
        dir.path(),
        "responses.csv",
        "person_id,question_concept_id\n10,1585889\n",
    );
    let config = PipelineConfig::new(&input, dir.path().join("out"));

    let error = run_pipeline(&config).unwrap_err();
    assert!(format!("{error:#}").contains("answer_concept_id"));
}

#[test]
fn reference_dir_override_points_at_key_file() {
    let path = reference_key_path(Some(Path::new("/srv/keys")));
    assert_eq!(path, Path::new("/srv/keys").join(REFERENCE_KEY_FILE));
    assert!(reference_key_path(None).ends_with(REFERENCE_KEY_FILE));
}

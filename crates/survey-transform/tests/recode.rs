//! Tests for the missing-value recoder.

use polars::prelude::*;
use proptest::prelude::*;
use survey_common::{column_f64s, column_i64s, column_strings};
use survey_ingest::IngestError;
use survey_model::{ListCellPolicy, RecodeOptions};
use survey_transform::{TransformError, recode};
use tempfile::TempDir;

#[test]
fn coded_missing_becomes_null() {
    let df = df!(
        "person_id" => [10i64, 12],
        "answer_numeric" => [-999i64, 4],
    )
    .expect("frame");
    let recoded = recode(&df, RecodeOptions::default()).expect("recode");
    assert_eq!(
        column_i64s(recoded.column("answer_numeric").expect("numeric")),
        vec![None, Some(4)]
    );
    assert_eq!(
        column_i64s(recoded.column("person_id").expect("person")),
        vec![Some(10), Some(12)]
    );
}

#[test]
fn range_is_closed_and_column_independent() {
    let df = df!(
        "q1" => [Some(-980.0f64), Some(-979.0), Some(-999.0), Some(-1000.0), None],
        "q2" => [-985i32, 0, 1, -5, -990],
        "note" => ["-999", "fine", "-980.0", "-1", ""],
    )
    .expect("frame");
    let recoded = recode(&df, RecodeOptions::default()).expect("recode");
    assert_eq!(
        column_f64s(recoded.column("q1").expect("q1")),
        vec![None, Some(-979.0), None, Some(-1000.0), None]
    );
    assert_eq!(recoded.column("q2").expect("q2").dtype(), &DataType::Int32);
    assert_eq!(
        column_i64s(recoded.column("q2").expect("q2")),
        vec![None, Some(0), Some(1), Some(-5), None]
    );
    assert_eq!(
        column_strings(recoded.column("note").expect("note")),
        vec![None, Some("fine".to_string()), None, Some("-1".to_string()), Some(String::new())]
    );
}

fn list_frame() -> DataFrame {
    let cells = vec![
        Series::new("".into(), [4.0f64]),
        Series::new("".into(), Vec::<f64>::new()),
        Series::new("".into(), [1.0f64, 2.0]),
        Series::new("".into(), [-999.0f64]),
    ];
    DataFrame::new(vec![
        Column::new("person_id".into(), [1i64, 2, 3, 4]),
        Series::new("answer_numeric".into(), cells).into_column(),
    ])
    .expect("frame")
}

#[test]
fn preserve_policy_keeps_mixed_list_columns_but_nulls_coded_elements() {
    let df = list_frame();
    let recoded = recode(&df, RecodeOptions::default()).expect("recode");
    let column = recoded.column("answer_numeric").expect("numeric");
    assert!(matches!(column.dtype(), DataType::List(_)));

    let cells: Vec<Vec<Option<f64>>> = (0..column.len())
        .map(|idx| match column.get(idx).expect("cell") {
            AnyValue::List(cell) => column_f64s(&cell.into_column()),
            other => panic!("expected a list cell, got {other:?}"),
        })
        .collect();
    assert_eq!(
        cells,
        vec![
            vec![Some(4.0)],
            vec![],
            vec![Some(1.0), Some(2.0)],
            vec![None],
        ]
    );
    assert_eq!(
        column_i64s(recoded.column("person_id").expect("person")),
        vec![Some(1), Some(2), Some(3), Some(4)]
    );

    let again = recode(&recoded, RecodeOptions::default()).expect("recode twice");
    assert!(again.equals_missing(&recoded));
}

#[test]
fn strict_policy_drops_empty_and_multi_element_lists() {
    let df = list_frame();
    let recoded = recode(
        &df,
        RecodeOptions::new().with_list_policy(ListCellPolicy::Strict),
    )
    .expect("recode");
    assert_eq!(
        column_f64s(recoded.column("answer_numeric").expect("numeric")),
        vec![Some(4.0), None, None, None]
    );
}

#[test]
fn singleton_lists_unwrap_under_either_policy() {
    let cells = vec![
        Series::new("".into(), ["Yes"]),
        Series::new("".into(), ["No"]),
    ];
    let df = DataFrame::new(vec![
        Series::new("answer_text".into(), cells).into_column(),
    ])
    .expect("frame");
    for policy in [ListCellPolicy::Preserve, ListCellPolicy::Strict] {
        let recoded = recode(&df, RecodeOptions::new().with_list_policy(policy)).expect("recode");
        let column = recoded.column("answer_text").expect("text");
        assert_eq!(column.dtype(), &DataType::String);
        assert_eq!(
            column_strings(column),
            vec![Some("Yes".to_string()), Some("No".to_string())]
        );
    }
}

#[test]
fn strict_variant_coerces_numeric_column() {
    let df = df!("answer_numeric" => ["4", "x", "-999", "2.5"]).expect("frame");
    let recoded = recode(&df, RecodeOptions::strict()).expect("recode");
    let column = recoded.column("answer_numeric").expect("numeric");
    assert_eq!(column.dtype(), &DataType::Float64);
    assert_eq!(column_f64s(column), vec![Some(4.0), None, None, Some(2.5)]);
}

#[test]
fn file_input_substitutes_at_load() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("pivot_n.txt");
    std::fs::write(&path, "person_id\tq1\tq2\n10\t-999\t3\n12\t4\t-998.0\n").expect("write");
    let recoded = recode(path.as_path(), RecodeOptions::default()).expect("recode");
    assert_eq!(column_f64s(recoded.column("q1").expect("q1")), vec![None, Some(4.0)]);
    assert_eq!(column_f64s(recoded.column("q2").expect("q2")), vec![Some(3.0), None]);
}

#[test]
fn unsupported_file_format_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("pivot.parquet");
    std::fs::write(&path, "x").expect("write");
    let err = recode(path.as_path(), RecodeOptions::default()).expect_err("unsupported");
    assert!(matches!(
        err,
        TransformError::Ingest(IngestError::UnsupportedFormat { .. })
    ));
}

proptest! {
    #[test]
    fn recoding_is_idempotent(
        ints in prop::collection::vec(prop::option::of(-1005i64..10), 0..40),
        floats in prop::collection::vec(prop::option::of(-1005.0f64..10.0), 0..40),
        strict in any::<bool>(),
    ) {
        let len = ints.len().min(floats.len());
        let df = df!(
            "a" => &ints[..len],
            "b" => &floats[..len],
        )
        .expect("frame");
        let options = if strict { RecodeOptions::strict() } else { RecodeOptions::default() };
        let once = recode(&df, options).expect("first pass");
        let twice = recode(&once, options).expect("second pass");
        prop_assert!(once.equals_missing(&twice));
    }
}

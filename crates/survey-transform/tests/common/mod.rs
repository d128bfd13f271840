#![allow(dead_code)]

use polars::prelude::*;
use survey_standards::{ReferenceKey, SentinelTable, load_default_reference_key};

pub fn reference_key() -> ReferenceKey {
    load_default_reference_key().expect("load bundled reference key")
}

pub fn sentinels() -> SentinelTable {
    SentinelTable::standard()
}

/// Raw responses for two persons covering sentinel, key, select-all and digit rows.
pub fn raw_responses() -> DataFrame {
    df!(
        "person_id" => [10i64, 10, 10, 10, 10, 11, 11, 11],
        "survey" => ["The Basics"; 8],
        "question_concept_id" => [1585889i64, 1585940, 1586140, 1586140, 1585900, 1585889, 1585940, 1586140],
        "question" => ["Smoke?", "Health?", "Race?", "Race?", "Age?", "Smoke?", "Health?", "Race?"],
        "answer_concept_id" => [Some(1585890i64), Some(903087), Some(1586141), Some(1586143), None, Some(1585891), Some(1585942), Some(1586146)],
        "answer" => [Some("Yes"), Some("Don't know"), Some("White"), Some("Asian"), Some("42"), Some("No"), Some("Very Good"), Some("Other")],
    )
    .expect("raw responses")
}

//! Column names of the long-format response table.

pub const PERSON_ID: &str = "person_id";
pub const SURVEY: &str = "survey";
pub const QUESTION_CONCEPT_ID: &str = "question_concept_id";
pub const QUESTION: &str = "question";
pub const ANSWER_CONCEPT_ID: &str = "answer_concept_id";
pub const ANSWER: &str = "answer";
pub const ANSWER_NUMERIC: &str = "answer_numeric";
pub const ANSWER_TEXT: &str = "answer_text";

/// Reference table column marking select-all-that-apply questions.
pub const SELECT_ALL: &str = "select_all";

/// Prefix put in front of question ids when they become wide-table columns.
pub const QUESTION_COLUMN_PREFIX: char = 'q';

/// Columns the warehouse fetch returns for one survey instrument.
pub const RAW_RESPONSE_COLUMNS: [&str; 6] = [
    PERSON_ID,
    SURVEY,
    QUESTION_CONCEPT_ID,
    QUESTION,
    ANSWER_CONCEPT_ID,
    ANSWER,
];

/// Builds the wide-table column name for a question id, e.g. `q43528662`.
pub fn question_column(question_id: &str) -> String {
    format!("{QUESTION_COLUMN_PREFIX}{question_id}")
}

//! Shared utilities for the survey response crates.
//!
//! This crate provides the Polars `AnyValue` helpers used across the
//! workspace to read identifiers, numbers and free text out of loosely
//! typed response tables.

pub mod values;

// Re-export commonly used functions at crate root for convenience
pub use values::{
    any_is_missing, any_to_f64, any_to_i64, any_to_string, any_to_string_non_empty,
    column_f64s, column_i64s, column_strings, format_numeric, is_all_digits, parse_f64,
    parse_i64,
};

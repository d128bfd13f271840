//! Shared data model for the survey response pipeline.
//!
//! Column names, option enums, scale definitions and the summaries each
//! stage reports back. Nothing in here touches a DataFrame.

pub mod columns;
pub mod options;
pub mod processing;
pub mod scale;

pub use options::{
    Aggregation, CompletenessMode, ExpandOptions, ListCellPolicy, PivotValue, RecodeOptions,
    SelectAllPolicy,
};
pub use processing::{NormalizationStats, OutputPaths, RunManifest};
pub use scale::{ScaleSpec, ScaleSummary};

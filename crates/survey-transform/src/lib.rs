//! Survey response transformation pipeline.
//!
//! Stages, in pipeline order:
//!
//! - **normalize**: resolve `answer_numeric`/`answer_text` from sentinels, the reference key and raw digits
//! - **expand**: give each selected option of a select-all question its own question id
//! - **recode**: turn coded-missing values into nulls and unwrap single-element lists
//! - **pivot**: long to wide, one row per person and one column per question
//! - **scale**: composite scores over wide columns
//!
//! **parallel** runs the normalizer over contiguous partitions on worker threads.
//! **codebook** lists the distinct question/answer combinations of a table.

pub mod codebook;
pub mod error;
pub mod expand;
mod frame;
pub mod normalize;
pub mod parallel;
pub mod pivot;
pub mod recode;
pub mod scale;

pub use codebook::build_codebook;
pub use error::{Result, TransformError};
pub use expand::{expand, expand_with_allocations};
pub use normalize::{
    AnswerResolver, ResolutionSource, ResolvedAnswer, normalize, normalize_with_stats,
};
pub use parallel::{ParallelOptions, normalize_parallel, normalize_parallel_with_stats};
pub use pivot::pivot;
pub use recode::{RecodeInput, recode};
pub use scale::{score, score_with_summary};

//! Library side of `omop-survey`: logging setup and the staged pipeline.

pub mod logging;
pub mod pipeline;

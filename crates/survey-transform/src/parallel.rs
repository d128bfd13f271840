//! Parallel Dispatcher for the Answer Normalizer.
//!
//! The table is cut into contiguous row slices, each normalized on its own
//! scoped thread, and the results are stacked back in slice order.

use std::num::NonZeroUsize;
use std::thread;

use polars::prelude::*;
use survey_model::NormalizationStats;
use survey_model::columns::{ANSWER, ANSWER_CONCEPT_ID, QUESTION_CONCEPT_ID};
use tracing::{debug, info};

use crate::error::{Result, TransformError};
use crate::frame::require_columns;
use crate::normalize::{AnswerResolver, normalize_with_stats};

/// Below this many rows per worker the table is normalized on the calling thread.
pub const DEFAULT_MIN_ROWS_PER_WORKER: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelOptions {
    pub workers: usize,
    pub min_rows_per_worker: usize,
}

impl Default for ParallelOptions {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            min_rows_per_worker: DEFAULT_MIN_ROWS_PER_WORKER,
        }
    }
}

impl ParallelOptions {
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    #[must_use]
    pub fn with_min_rows_per_worker(mut self, rows: usize) -> Self {
        self.min_rows_per_worker = rows.max(1);
        self
    }

    /// Number of partitions for a table of `rows` rows.
    pub fn partitions(&self, rows: usize) -> usize {
        let by_size = rows.div_ceil(self.min_rows_per_worker.max(1));
        self.workers.max(1).min(by_size).max(1)
    }
}

/// Same result as [`crate::normalize`], computed on worker threads.
pub fn normalize_parallel(
    responses: &DataFrame,
    resolver: &AnswerResolver<'_>,
    options: &ParallelOptions,
) -> Result<DataFrame> {
    normalize_parallel_with_stats(responses, resolver, options).map(|(df, _)| df)
}

/// [`normalize_parallel`] plus the merged statistics of every partition.
///
/// The first failing partition, in submission order, fails the whole call; a
/// panicking worker surfaces as [`TransformError::WorkerPanicked`].
pub fn normalize_parallel_with_stats(
    responses: &DataFrame,
    resolver: &AnswerResolver<'_>,
    options: &ParallelOptions,
) -> Result<(DataFrame, NormalizationStats)> {
    require_columns(
        responses,
        "normalize",
        &[QUESTION_CONCEPT_ID, ANSWER_CONCEPT_ID, ANSWER],
    )?;

    let height = responses.height();
    let partitions = options.partitions(height);
    if partitions <= 1 {
        debug!(rows = height, "normalizing on the calling thread");
        return normalize_with_stats(responses, resolver);
    }

    let chunk = height.div_ceil(partitions);
    let slices: Vec<DataFrame> = (0..partitions)
        .map(|idx| idx * chunk)
        .take_while(|offset| *offset < height)
        .map(|offset| responses.slice(offset as i64, chunk.min(height - offset)))
        .collect();
    debug!(rows = height, partitions = slices.len(), chunk, "dispatching partitions");

    let resolver = *resolver;
    let outcomes = run_partitions(&slices, |slice| normalize_with_stats(slice, &resolver));
    let (output, stats) = match concat_outcomes(outcomes)? {
        Some(combined) => combined,
        None => normalize_with_stats(responses, &resolver)?,
    };

    info!(
        rows = output.height(),
        partitions = slices.len(),
        "parallel normalization complete"
    );
    Ok((output, stats))
}

/// Runs `work` on every slice in its own scoped thread.
///
/// Outcomes come back in slice order whatever order the workers finish in.
fn run_partitions<T, F>(slices: &[DataFrame], work: F) -> Vec<Result<T>>
where
    T: Send,
    F: Fn(&DataFrame) -> Result<T> + Sync,
{
    let work = &work;
    thread::scope(|scope| {
        let handles: Vec<_> = slices
            .iter()
            .map(|slice| scope.spawn(move || work(slice)))
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(partition, handle)| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(TransformError::WorkerPanicked { partition }))
            })
            .collect()
    })
}

/// Stacks partition results in order. The first failure fails the whole set.
fn concat_outcomes(
    outcomes: Vec<Result<(DataFrame, NormalizationStats)>>,
) -> Result<Option<(DataFrame, NormalizationStats)>> {
    let mut stats = NormalizationStats::default();
    let mut output: Option<DataFrame> = None;
    for outcome in outcomes {
        let (df, partition_stats) = outcome?;
        stats.merge(&partition_stats);
        match output.as_mut() {
            Some(acc) => {
                acc.vstack_mut(&df)?;
            }
            None => output = Some(df),
        }
    }
    Ok(output.map(|df| (df, stats)))
}

//! Batch distribution for scenario sweeps.
//!
//! Scenarios are split into batches; each batch runs in parallel on the pool and
//! progress is reported once per finished batch.

use rayon::prelude::*;

use crate::error::Result;
use crate::parallel::pool::WorkerPool;
use crate::simulation::{run_scenario_parallel, Scenario, ScenarioSummary};

/// Batches used for progress reporting during a sweep.
pub const PROGRESS_BATCHES: usize = 10;

/// Split `total` items into up to `num_batches` ranges `[start, end)`.
/// Batches are as equal in size as possible; earlier batches take the remainder.
///
/// # Example
/// ```
/// # use critline::parallel::batch_ranges;
/// let ranges = batch_ranges(10, 3);
/// assert_eq!(ranges, vec![(0, 4), (4, 7), (7, 10)]);
/// ```
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let num_batches = num_batches.min(total);
    let base = total / num_batches;
    let remainder = total % num_batches;
    let mut ranges = Vec::with_capacity(num_batches);
    let mut start = 0;
    for i in 0..num_batches {
        let end = start + base + usize::from(i < remainder);
        ranges.push((start, end));
        start = end;
    }
    ranges
}

pub fn run_scenario_batches(
    scenarios: &[Scenario],
    pool: &WorkerPool,
) -> Result<Vec<ScenarioSummary>> {
    run_scenario_batches_with_progress(scenarios, pool, |_, _| {})
}

/// Runs every scenario on `pool`, calling `on_progress(done, total)` after each batch.
/// All scenarios are validated before any encounter runs. Output order matches input.
pub fn run_scenario_batches_with_progress<F>(
    scenarios: &[Scenario],
    pool: &WorkerPool,
    mut on_progress: F,
) -> Result<Vec<ScenarioSummary>>
where
    F: FnMut(usize, usize),
{
    for scenario in scenarios {
        scenario.validate()?;
    }

    let total = scenarios.len();
    let mut summaries = Vec::with_capacity(total);
    for (start, end) in batch_ranges(total, PROGRESS_BATCHES) {
        let batch = &scenarios[start..end];
        let finished = pool.install(|| {
            batch
                .par_iter()
                .map(run_scenario_parallel)
                .collect::<Result<Vec<_>>>()
        })?;
        summaries.extend(finished?);
        on_progress(end, total);
    }
    Ok(summaries)
}

//! Independent trials across threads.

use crate::report::SimulationStats;
use crate::trial::Trial;
use combatsim_core::SimError;
use rayon::prelude::*;
use tracing::info;

/// Seed of iteration `index` of a run seeded with `base`.
///
/// Sequential and parallel runs derive seeds the same way, so they produce
/// identical reports.
pub fn iteration_seed(base: u64, index: u64) -> u64 {
    base.wrapping_add(index)
}

/// Run `iterations` independent trials in parallel.
///
/// `factory` builds a fresh trial for each iteration from that iteration's
/// seed; trials never share state. The first error aborts the run.
pub fn run_parallel<F>(iterations: u64, base_seed: u64, factory: F) -> Result<SimulationStats, SimError>
where
    F: Fn(u64) -> Result<Trial, SimError> + Sync,
{
    let reports = (0..iterations)
        .into_par_iter()
        .map(|i| {
            let seed = iteration_seed(base_seed, i);
            let mut trial = factory(seed)?;
            trial.run_seeded(seed)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let stats = SimulationStats::from_reports(&reports);
    info!(
        iterations = stats.iterations,
        mean_dps = stats.dps.mean,
        starved_iterations = stats.starved_iterations,
        "Parallel run finished"
    );
    Ok(stats)
}

// Monte Carlo Infrastructure: N runs per scenario with statistical aggregation
// Each scenario runs N times with seeds base..base+N, computing mean ± 95% CI

use coop_engine::{CoopSimulation, SimError};
use tracing::warn;

use crate::metrics::{advantage_per_member, relative_advantage};
use crate::report::*;
use crate::scenarios::Scenario;
use crate::time_series::TimeSeriesRecorder;

use std::time::Instant;

/// Run a single scenario iteration with a specific seed.
pub fn run_single(
    scenario: &Scenario,
    seed: u64,
    time_series_dir: Option<&std::path::Path>,
) -> Result<BenchResult, SimError> {
    let start = Instant::now();
    let mut params = scenario.params.clone();
    params.seed = Some(seed);

    let mut sim = CoopSimulation::new(params)?;
    let mut time_series = time_series_dir.map(|_| TimeSeriesRecorder::new());

    while !sim.is_complete() {
        sim.step_week()?;
        if let (Some(ts), Some(metrics)) = (time_series.as_mut(), sim.history().last()) {
            ts.record(metrics, sim.key_events().len());
        }
    }
    let faults = sim.faults().total();
    let members = sim.members().len();
    let results = sim.finish()?;

    if let (Some(ts), Some(dir)) = (&time_series, time_series_dir) {
        let path = dir.join(format!("seed-{}.jsonl", seed));
        if let Err(e) = ts.write_jsonl(&path) {
            warn!(path = %path.display(), error = %e, "failed to write time series");
        }
    }

    let elapsed = start.elapsed();
    let elapsed_secs = elapsed.as_secs_f64().max(0.001);
    let weeks = results.history.len();

    let last = results
        .final_week()
        .ok_or_else(|| SimError::Assembly("empty history".into()))?;

    // Evaluate pass/fail
    let criteria = &scenario.criteria;
    let mut pass = faults <= criteria.max_faults;
    if criteria.require_b_beats_a && last.total_wealth_b <= last.total_wealth_a {
        pass = false;
    }
    if criteria.require_poverty_b_le_a && last.poverty_rate_b > last.poverty_rate_a {
        pass = false;
    }
    if let Some(max_gini) = criteria.max_final_gini_b {
        if last.gini_b > max_gini {
            pass = false;
        }
    }
    if criteria.expect_gap_sentinel && last.wealth_gap_b.is_finite() {
        pass = false;
    }

    Ok(BenchResult {
        scenario: scenario.label.to_string(),
        name: scenario.name.to_string(),
        category: scenario.category.to_string(),
        seed,
        pass,
        members,
        weeks,
        final_total_wealth_a: last.total_wealth_a,
        final_total_wealth_b: last.total_wealth_b,
        relative_advantage: relative_advantage(&results),
        advantage_per_member: advantage_per_member(&results),
        final_gini_a: last.gini_a,
        final_gini_b: last.gini_b,
        final_poverty_rate_a: last.poverty_rate_a,
        final_poverty_rate_b: last.poverty_rate_b,
        final_wealth_gap_b: last.wealth_gap_b,
        final_community_resilience: last.community_resilience,
        key_events: results.key_events.len(),
        faults,
        elapsed_ms: elapsed.as_millis(),
        weeks_per_sec: weeks as f64 / elapsed_secs,
    })
}

/// Run Monte Carlo: N runs of a scenario, aggregate stats.
pub fn run_monte_carlo(
    scenario: &Scenario,
    n_runs: usize,
    base_seed: u64,
    time_series_base: Option<&std::path::Path>,
) -> Result<MonteCarloReport, SimError> {
    let ts_dir = time_series_base.map(|base| base.join(scenario.name.to_lowercase()));

    let mut results = Vec::with_capacity(n_runs);
    for i in 0..n_runs {
        let seed = base_seed + i as u64;
        results.push(run_single(scenario, seed, ts_dir.as_deref())?);
    }

    Ok(aggregate(scenario, results))
}

fn stats_of(results: &[BenchResult], f: impl Fn(&BenchResult) -> f64) -> Stats {
    Stats::from_samples(&results.iter().map(f).collect::<Vec<_>>())
}

/// Aggregate individual runs into a MonteCarloReport.
fn aggregate(scenario: &Scenario, results: Vec<BenchResult>) -> MonteCarloReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();
    let pass_rate = if n > 0 { passed as f64 / n as f64 } else { 0.0 };

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: n,
        pass_rate,
        relative_advantage: stats_of(&results, |r| r.relative_advantage),
        advantage_per_member: stats_of(&results, |r| r.advantage_per_member),
        final_gini_a: stats_of(&results, |r| r.final_gini_a),
        final_gini_b: stats_of(&results, |r| r.final_gini_b),
        final_poverty_rate_a: stats_of(&results, |r| r.final_poverty_rate_a),
        final_poverty_rate_b: stats_of(&results, |r| r.final_poverty_rate_b),
        key_events: stats_of(&results, |r| r.key_events as f64),
        elapsed_ms: stats_of(&results, |r| r.elapsed_ms as f64),
        weeks_per_sec: stats_of(&results, |r| r.weeks_per_sec),
        individual_runs: results,
    }
}

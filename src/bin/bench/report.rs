// Benchmark Report Types
// Structured output for independent analysis of regime comparisons

use serde::Serialize;

use crate::metrics::PairedComparison;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    /// Sample statistics with a normal-approximation 95% CI. Non-finite
    /// samples (e.g. an undefined wealth gap) are skipped.
    pub fn from_samples(samples: &[f64]) -> Self {
        let finite: Vec<f64> = samples.iter().copied().filter(|x| x.is_finite()).collect();
        let n = finite.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = finite.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            finite.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: finite.iter().cloned().fold(f64::INFINITY, f64::min),
            max: finite.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    pub scenario: String,
    pub name: String,
    pub category: String,
    pub seed: u64,
    pub pass: bool,
    pub members: usize,
    pub weeks: usize,
    pub final_total_wealth_a: f64,
    pub final_total_wealth_b: f64,
    /// (B - A) / max(A, 1)
    pub relative_advantage: f64,
    /// (B - A) per member
    pub advantage_per_member: f64,
    pub final_gini_a: f64,
    pub final_gini_b: f64,
    pub final_poverty_rate_a: f64,
    pub final_poverty_rate_b: f64,
    pub final_wealth_gap_b: f64,
    pub final_community_resilience: f64,
    pub key_events: usize,
    pub faults: u64,
    pub elapsed_ms: u128,
    pub weeks_per_sec: f64,
}

// ─── Monte Carlo Report (per-scenario aggregation) ──────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub scenario_name: String,
    pub label: String,
    pub category: String,
    pub n_runs: usize,
    pub pass_rate: f64,
    pub relative_advantage: Stats,
    pub advantage_per_member: Stats,
    pub final_gini_a: Stats,
    pub final_gini_b: Stats,
    pub final_poverty_rate_a: Stats,
    pub final_poverty_rate_b: Stats,
    pub key_events: Stats,
    pub elapsed_ms: Stats,
    pub weeks_per_sec: Stats,
    pub individual_runs: Vec<BenchResult>,
}

// ─── Model Validation Summary ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ModelValidation {
    pub baseline_b_beats_a: bool,
    pub baseline_poverty_b_le_a: bool,
    pub stress_widens_advantage: bool,
    pub propensity_drives_savings: bool,
    pub small_population_sentinel: bool,
    pub stress_comparison: Option<PairedComparison>,
    pub propensity_comparison: Option<PairedComparison>,
}

impl ModelValidation {
    pub fn all_pass(&self) -> bool {
        self.baseline_b_beats_a
            && self.baseline_poverty_b_le_a
            && self.stress_widens_advantage
            && self.propensity_drives_savings
            && self.small_population_sentinel
    }
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub n_runs_per_scenario: usize,
    pub base_seed: u64,
    pub summary: Summary,
    pub model_validation: ModelValidation,
    pub scenarios: Vec<MonteCarloReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}

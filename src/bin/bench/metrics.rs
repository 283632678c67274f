// Paired Regime Comparisons: same seed, one parameter changed
// Isolates a single mechanism by holding the member population fixed

use coop_engine::{run, SimError, SimulationParams, SimulationResults};
use serde::Serialize;

use crate::scenarios::{fixed_propensity, severe_stress};

// ─── Advantage Measures ─────────────────────────────────────────────────────

/// Regime-B advantage relative to regime A: (B - A) / max(A, 1).
pub fn relative_advantage(results: &SimulationResults) -> f64 {
    results
        .final_week()
        .map(|m| (m.total_wealth_b - m.total_wealth_a) / m.total_wealth_a.max(1.0))
        .unwrap_or(0.0)
}

/// Regime-B advantage in currency per member.
pub fn advantage_per_member(results: &SimulationResults) -> f64 {
    let n = results.final_members.len().max(1) as f64;
    results
        .final_week()
        .map(|m| (m.total_wealth_b - m.total_wealth_a) / n)
        .unwrap_or(0.0)
}

// ─── Paired Comparison ──────────────────────────────────────────────────────

/// Result of a paired run: a control and a treatment that differ in one
/// parameter. `passes` when the treatment moves the advantage the way the
/// model predicts.
#[derive(Debug, Clone, Serialize)]
pub struct PairedComparison {
    pub label: &'static str,
    pub seed: u64,
    pub control_advantage: f64,
    pub treatment_advantage: f64,
    pub passes: bool,
}

fn seeded(params: &SimulationParams, seed: u64) -> SimulationParams {
    SimulationParams { seed: Some(seed), ..params.clone() }
}

/// Baseline vs income at 60% of budget: stress should widen the relative
/// advantage of the cooperative regime.
pub fn run_stress_comparison(base: &SimulationParams, seed: u64) -> Result<PairedComparison, SimError> {
    let control = run(seeded(base, seed))?;
    let treatment = run(seeded(&severe_stress(base), seed))?;
    let control_advantage = relative_advantage(&control);
    let treatment_advantage = relative_advantage(&treatment);
    Ok(PairedComparison {
        label: "baseline vs severe stress (relative advantage)",
        seed,
        control_advantage,
        treatment_advantage,
        passes: treatment_advantage > control_advantage,
    })
}

/// Near-zero vs high internal propensity: the savings-derived advantage
/// should shrink when nobody spends inside the cooperative.
pub fn run_propensity_comparison(base: &SimulationParams, seed: u64) -> Result<PairedComparison, SimError> {
    let control = run(seeded(&fixed_propensity(base, 0.90), seed))?;
    let treatment = run(seeded(&fixed_propensity(base, 0.02), seed))?;
    let control_advantage = advantage_per_member(&control);
    let treatment_advantage = advantage_per_member(&treatment);
    Ok(PairedComparison {
        label: "high vs near-zero propensity (advantage per member)",
        seed,
        control_advantage,
        treatment_advantage,
        passes: treatment_advantage < control_advantage,
    })
}

// Scenario Catalog: named parameter bundles with pass/fail criteria
// Every scenario is plain SimulationParams; the seed is assigned per run.

use coop_engine::{EconomicShock, SimulationParams};

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub params: SimulationParams,
    pub criteria: PassCriteria,
}

pub struct PassCriteria {
    /// Final total wealth B must exceed total wealth A.
    pub require_b_beats_a: bool,
    /// Final poverty rate B must not exceed poverty rate A.
    pub require_poverty_b_le_a: bool,
    /// Upper bound on the final regime-B Gini.
    pub max_final_gini_b: Option<f64>,
    /// Final wealth gap must report the small-population sentinel.
    pub expect_gap_sentinel: bool,
    /// Maximum recovered member faults over the whole run.
    pub max_faults: u64,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            require_b_beats_a: false,
            require_poverty_b_le_a: false,
            max_final_gini_b: None,
            expect_gap_sentinel: false,
            max_faults: 0,
        }
    }
}

// ─── Parameter Helpers ──────────────────────────────────────────────────────

/// Weekly income at 60% of the average food budget for the whole run.
/// Every other parameter is left as in `base`.
pub fn severe_stress(base: &SimulationParams) -> SimulationParams {
    SimulationParams { weekly_income_avg: base.weekly_food_budget_avg * 0.6, ..base.clone() }
}

/// Internal spending propensity forced to `level` with negligible spread.
pub fn fixed_propensity(base: &SimulationParams, level: f64) -> SimulationParams {
    SimulationParams {
        percent_spend_internal_avg: level,
        percent_spend_internal_stddev: 0.0,
        ..base.clone()
    }
}

// ─── Catalog ────────────────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    let base = SimulationParams::default();

    vec![
        // ─── Reference (1) ──────────────────────────────────────────────
        Scenario { name: "BASELINE", label: "Baseline: 50 members x 3 years", category: "reference",
            params: base.clone(),
            criteria: PassCriteria { require_b_beats_a: true, require_poverty_b_le_a: true, ..Default::default() } },

        // ─── Economic Stress (2) ────────────────────────────────────────
        Scenario { name: "SEVERE_STRESS", label: "Stress: income at 60% of budget", category: "stress",
            params: severe_stress(&base),
            criteria: PassCriteria { require_b_beats_a: true, require_poverty_b_le_a: true, ..Default::default() } },
        Scenario { name: "INCOME_SHOCK", label: "Stress: 40% income for 26 weeks", category: "stress",
            params: SimulationParams {
                shocks: vec![EconomicShock { start_week: 40, duration_weeks: 26, income_factor: 0.4, cost_factor: 1.0 }],
                ..base.clone()
            },
            criteria: PassCriteria { require_b_beats_a: true, ..Default::default() } },
        Scenario { name: "PRICE_SHOCK", label: "Stress: food prices +50% for a year", category: "stress",
            params: SimulationParams {
                shocks: vec![EconomicShock { start_week: 26, duration_weeks: 52, income_factor: 1.0, cost_factor: 1.5 }],
                ..base.clone()
            },
            criteria: PassCriteria { require_b_beats_a: true, ..Default::default() } },

        // ─── Participation (2) ──────────────────────────────────────────
        Scenario { name: "LOW_PARTICIPATION", label: "Participation: propensity 0.02", category: "participation",
            params: fixed_propensity(&base, 0.02),
            criteria: PassCriteria::default() },
        Scenario { name: "HIGH_PARTICIPATION", label: "Participation: propensity 0.90", category: "participation",
            params: fixed_propensity(&base, 0.90),
            criteria: PassCriteria { require_b_beats_a: true, require_poverty_b_le_a: true, ..Default::default() } },

        // ─── Inequality (1) ─────────────────────────────────────────────
        Scenario { name: "HIGH_INEQUALITY", label: "Inequality: wealth sigma 1.4", category: "inequality",
            params: SimulationParams { initial_wealth_sigma_log: 1.4, ..base.clone() },
            criteria: PassCriteria { require_b_beats_a: true, max_final_gini_b: Some(0.9), ..Default::default() } },

        // ─── Community Scale (3) ────────────────────────────────────────
        Scenario { name: "SMALL_COMMUNITY", label: "Scale: 8 members", category: "scale",
            params: SimulationParams { num_members: 8, ..base.clone() },
            criteria: PassCriteria::default() },
        Scenario { name: "LARGE_COMMUNITY", label: "Scale: 2K members x 1 year", category: "scale",
            params: SimulationParams { num_members: 2000, simulation_weeks: 52, ..base.clone() },
            criteria: PassCriteria { require_b_beats_a: true, ..Default::default() } },
        Scenario { name: "SINGLE_MEMBER", label: "Scale: population of 1", category: "scale",
            params: SimulationParams { num_members: 1, simulation_weeks: 52, ..base },
            criteria: PassCriteria { expect_gap_sentinel: true, ..Default::default() } },
    ]
}

/// Wrap a user-supplied parameter file as an ad-hoc scenario.
pub fn custom(params: SimulationParams) -> Scenario {
    Scenario {
        name: "CUSTOM",
        label: "Custom parameters",
        category: "custom",
        params,
        criteria: PassCriteria::default(),
    }
}

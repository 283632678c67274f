// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Cooperative Economy Simulation Engine - Parameter Set

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Invalid parameter values. Always fatal, reported before any simulation work.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a positive integer")]
    NotPositive { field: &'static str },
    #[error("{field} must be non-negative (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must be between 0 and 1 (got {value})")]
    OutOfUnitRange { field: &'static str, value: f64 },
    #[error("shock #{index}: {reason}")]
    InvalidShock { index: usize, reason: &'static str },
    #[error("calibration: {reason}")]
    InvalidCalibration { reason: &'static str },
}

// ---------------------------------------------------------------------------
// Economic shocks
// ---------------------------------------------------------------------------

/// A time-bounded disturbance applied to every member's income and/or costs.
///
/// Active for weeks `start_week .. start_week + duration_weeks` (1-based).
/// Factors multiply the member's fixed weekly income and food budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicShock {
    pub start_week: u32,
    pub duration_weeks: u32,
    #[serde(default = "unit_factor")]
    pub income_factor: f64,
    #[serde(default = "unit_factor")]
    pub cost_factor: f64,
}

fn unit_factor() -> f64 {
    1.0
}

impl EconomicShock {
    pub fn is_active(&self, week: u32) -> bool {
        week >= self.start_week && week < self.start_week.saturating_add(self.duration_weeks)
    }
}

// ---------------------------------------------------------------------------
// Calibration constants
// ---------------------------------------------------------------------------

/// Empirically chosen thresholds. Kept overridable; the defaults reproduce
/// the reference model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Poverty line = multiplier x average weekly food budget.
    pub poverty_line_multiplier: f64,
    /// Below this population size the wealth gap reports +infinity.
    pub wealth_gap_min_population: usize,
    /// Stress level above which behaviour switches to survival mode.
    pub severe_stress_threshold: f64,
    /// Lower bound for bounded composite indices.
    pub index_floor: f64,
    /// Upper bound for bounded composite indices.
    pub index_ceiling: f64,
    /// Gini_B must fall to this fraction of last week's value to raise an event.
    pub equality_event_ratio: f64,
    /// PovertyRate_B must fall to this fraction of last week's value to raise an event.
    pub poverty_event_ratio: f64,
    /// Values with magnitude below this count as zero in trend and ratio math.
    pub epsilon: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            poverty_line_multiplier: 4.0,
            wealth_gap_min_population: 5,
            severe_stress_threshold: 0.6,
            index_floor: 0.1,
            index_ceiling: 0.9,
            equality_event_ratio: 0.95,
            poverty_event_ratio: 0.90,
            epsilon: 1e-6,
        }
    }
}

// ---------------------------------------------------------------------------
// SimulationParams
// ---------------------------------------------------------------------------

/// Immutable configuration bundle for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub num_members: usize,
    pub simulation_weeks: u32,
    /// `None` draws a fresh seed from OS entropy.
    pub seed: Option<u64>,

    pub initial_wealth_mean_log: f64,
    pub initial_wealth_sigma_log: f64,

    pub weekly_food_budget_avg: f64,
    pub weekly_food_budget_stddev: f64,
    pub min_weekly_budget: f64,

    pub weekly_income_avg: f64,
    pub weekly_income_stddev: f64,
    pub min_weekly_income: f64,

    pub group_buy_savings_percent: f64,
    pub local_production_savings_percent: f64,

    pub percent_spend_internal_avg: f64,
    pub percent_spend_internal_stddev: f64,

    pub token_reward_per_week_avg: f64,
    pub token_reward_stddev: f64,
    pub token_usd_value: f64,

    pub weekly_coop_fee: f64,

    pub shocks: Vec<EconomicShock>,
    pub calibration: Calibration,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            num_members: 50,
            simulation_weeks: 52 * 3,
            seed: None,
            initial_wealth_mean_log: 1000.0_f64.ln(),
            initial_wealth_sigma_log: 0.6,
            weekly_food_budget_avg: 75.0,
            weekly_food_budget_stddev: 15.0,
            min_weekly_budget: 20.0,
            weekly_income_avg: 150.0,
            weekly_income_stddev: 40.0,
            min_weekly_income: 0.0,
            group_buy_savings_percent: 0.15,
            local_production_savings_percent: 0.25,
            percent_spend_internal_avg: 0.60,
            percent_spend_internal_stddev: 0.20,
            token_reward_per_week_avg: 0.5,
            token_reward_stddev: 0.2,
            token_usd_value: 2.0,
            weekly_coop_fee: 1.0,
            shocks: Vec::new(),
            calibration: Calibration::default(),
        }
    }
}

impl SimulationParams {
    /// Baseline parameters with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed), ..Self::default() }
    }

    /// Poverty line in currency units.
    pub fn poverty_line(&self) -> f64 {
        self.weekly_food_budget_avg * self.calibration.poverty_line_multiplier
    }

    /// Theoretical mean of the initial log-normal wealth distribution.
    pub fn theoretical_mean_wealth(&self) -> f64 {
        let sigma = self.initial_wealth_sigma_log;
        (self.initial_wealth_mean_log + sigma * sigma / 2.0).exp()
    }

    /// Combined income and cost multipliers of every shock active in `week`.
    pub fn shock_factors(&self, week: u32) -> (f64, f64) {
        self.shocks
            .iter()
            .filter(|s| s.is_active(week))
            .fold((1.0, 1.0), |(inc, cost), s| (inc * s.income_factor, cost * s.cost_factor))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_members == 0 {
            return Err(ConfigError::NotPositive { field: "num_members" });
        }
        if self.simulation_weeks == 0 {
            return Err(ConfigError::NotPositive { field: "simulation_weeks" });
        }

        finite("initial_wealth_mean_log", self.initial_wealth_mean_log)?;
        non_negative("initial_wealth_sigma_log", self.initial_wealth_sigma_log)?;

        non_negative("weekly_food_budget_avg", self.weekly_food_budget_avg)?;
        non_negative("weekly_food_budget_stddev", self.weekly_food_budget_stddev)?;
        non_negative("min_weekly_budget", self.min_weekly_budget)?;

        non_negative("weekly_income_avg", self.weekly_income_avg)?;
        non_negative("weekly_income_stddev", self.weekly_income_stddev)?;
        non_negative("min_weekly_income", self.min_weekly_income)?;

        unit_range("group_buy_savings_percent", self.group_buy_savings_percent)?;
        unit_range("local_production_savings_percent", self.local_production_savings_percent)?;
        unit_range("percent_spend_internal_avg", self.percent_spend_internal_avg)?;
        non_negative("percent_spend_internal_stddev", self.percent_spend_internal_stddev)?;

        non_negative("token_reward_per_week_avg", self.token_reward_per_week_avg)?;
        non_negative("token_reward_stddev", self.token_reward_stddev)?;
        non_negative("token_usd_value", self.token_usd_value)?;
        non_negative("weekly_coop_fee", self.weekly_coop_fee)?;

        for (index, shock) in self.shocks.iter().enumerate() {
            if shock.start_week == 0 {
                return Err(ConfigError::InvalidShock { index, reason: "start_week is 1-based" });
            }
            if !(shock.income_factor.is_finite() && shock.income_factor >= 0.0) {
                return Err(ConfigError::InvalidShock { index, reason: "income_factor must be >= 0" });
            }
            if !(shock.cost_factor.is_finite() && shock.cost_factor >= 0.0) {
                return Err(ConfigError::InvalidShock { index, reason: "cost_factor must be >= 0" });
            }
        }

        let cal = &self.calibration;
        non_negative("calibration.poverty_line_multiplier", cal.poverty_line_multiplier)?;
        unit_range("calibration.severe_stress_threshold", cal.severe_stress_threshold)?;
        unit_range("calibration.index_floor", cal.index_floor)?;
        unit_range("calibration.index_ceiling", cal.index_ceiling)?;
        if cal.index_floor > cal.index_ceiling {
            return Err(ConfigError::InvalidCalibration { reason: "index_floor exceeds index_ceiling" });
        }
        unit_range("calibration.equality_event_ratio", cal.equality_event_ratio)?;
        unit_range("calibration.poverty_event_ratio", cal.poverty_event_ratio)?;
        non_negative("calibration.epsilon", cal.epsilon)?;

        Ok(())
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

fn unit_range(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfUnitRange { field, value });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimulationParams::default().validate().is_ok());
    }

    #[test]
    fn test_default_wealth_log_mean() {
        let p = SimulationParams::default();
        assert!((p.initial_wealth_mean_log - 6.907_755).abs() < 1e-5);
        // exp(mu + sigma^2/2) = 1000 * e^0.18
        assert!((p.theoretical_mean_wealth() - 1197.217).abs() < 0.01);
    }

    #[test]
    fn test_rejects_zero_members() {
        let p = SimulationParams { num_members: 0, ..Default::default() };
        let err = p.validate().unwrap_err();
        assert_eq!(err, ConfigError::NotPositive { field: "num_members" });
        assert!(err.to_string().contains("positive integer"));
    }

    #[test]
    fn test_rejects_zero_weeks() {
        let p = SimulationParams { simulation_weeks: 0, ..Default::default() };
        assert_eq!(p.validate(), Err(ConfigError::NotPositive { field: "simulation_weeks" }));
    }

    #[test]
    fn test_rejects_out_of_range_propensity() {
        let p = SimulationParams { percent_spend_internal_avg: 1.5, ..Default::default() };
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("between 0 and 1"));
    }

    #[test]
    fn test_rejects_negative_rates() {
        let p = SimulationParams { weekly_coop_fee: -1.0, ..Default::default() };
        assert!(matches!(p.validate(), Err(ConfigError::Negative { field: "weekly_coop_fee", .. })));

        let p = SimulationParams { token_usd_value: f64::NAN, ..Default::default() };
        assert!(matches!(p.validate(), Err(ConfigError::NotFinite { field: "token_usd_value" })));
    }

    #[test]
    fn test_rejects_bad_shock() {
        let p = SimulationParams {
            shocks: vec![EconomicShock { start_week: 0, duration_weeks: 4, income_factor: 0.5, cost_factor: 1.0 }],
            ..Default::default()
        };
        assert!(matches!(p.validate(), Err(ConfigError::InvalidShock { index: 0, .. })));
    }

    #[test]
    fn test_rejects_inverted_index_bounds() {
        let mut p = SimulationParams::default();
        p.calibration.index_floor = 0.8;
        p.calibration.index_ceiling = 0.2;
        assert!(matches!(p.validate(), Err(ConfigError::InvalidCalibration { .. })));
    }

    #[test]
    fn test_shock_window_and_factors() {
        let p = SimulationParams {
            shocks: vec![
                EconomicShock { start_week: 10, duration_weeks: 5, income_factor: 0.5, cost_factor: 1.0 },
                EconomicShock { start_week: 12, duration_weeks: 1, income_factor: 1.0, cost_factor: 1.2 },
            ],
            ..Default::default()
        };
        assert_eq!(p.shock_factors(9), (1.0, 1.0));
        assert_eq!(p.shock_factors(10), (0.5, 1.0));
        let (inc, cost) = p.shock_factors(12);
        assert_eq!(inc, 0.5);
        assert!((cost - 1.2).abs() < 1e-12);
        assert_eq!(p.shock_factors(15), (1.0, 1.0));
    }

    #[test]
    fn test_poverty_line_uses_multiplier() {
        let mut p = SimulationParams::default();
        assert_eq!(p.poverty_line(), 300.0);
        p.calibration.poverty_line_multiplier = 3.0;
        assert_eq!(p.poverty_line(), 225.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let p: SimulationParams =
            serde_json::from_str(r#"{"num_members": 10, "simulation_weeks": 4, "seed": 7}"#).unwrap();
        assert_eq!(p.num_members, 10);
        assert_eq!(p.seed, Some(7));
        assert_eq!(p.weekly_food_budget_avg, 75.0);
        assert_eq!(p.calibration, Calibration::default());
    }

    #[test]
    fn test_serde_roundtrip() {
        let p = SimulationParams::seeded(42);
        let json = serde_json::to_string(&p).unwrap();
        let back: SimulationParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}

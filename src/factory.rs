// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Cooperative Economy Simulation Engine - Member Factory
//
// Builds the initial population. Wealth is drawn for every member first,
// then each member draws budget, propensity, income and token usage rate in
// turn from the same ChaCha8 stream, so a seed fixes the whole population.

use rand::Rng;
use rand_distr::{Distribution, LogNormal, Normal};

use crate::error::SimError;
use crate::params::SimulationParams;
use crate::types::Member;

/// Logistic approximation of the standard normal CDF: Phi(z) ~ 1/(1+e^(-1.702 z)).
const LOGISTIC_NORMAL_SCALE: f64 = 1.702;
const QUINTILES: u8 = 5;

/// Log-sigma at which initial inequality starts to count.
const INEQUALITY_SIGMA_BASE: f64 = 0.3;
/// Log-sigma span mapped onto an inequality level of 0..1.
const INEQUALITY_SIGMA_SPAN: f64 = 0.9;
const HIGH_INEQUALITY_LEVEL: f64 = 0.5;
const EXTREME_INEQUALITY_LEVEL: f64 = 0.8;

/// Savings-plus-token incentive (as a share of budget) that counts as strong.
const STRONG_INCENTIVE: f64 = 0.3;

/// Initial token usage rate is uniform in [0, MAX_INITIAL_TOKEN_USAGE).
const MAX_INITIAL_TOKEN_USAGE: f64 = 0.1;

/// Inequality level in [0, 1] derived from the initial wealth log-sigma.
pub fn inequality_level(sigma_log: f64) -> f64 {
    ((sigma_log - INEQUALITY_SIGMA_BASE) / INEQUALITY_SIGMA_SPAN).clamp(0.0, 1.0)
}

/// Approximate population percentile of `wealth`, measured against the
/// theoretical (not sampled) mean of the log-normal distribution.
pub fn approximate_percentile(wealth: f64, theoretical_mean: f64, sigma_log: f64) -> f64 {
    if sigma_log <= 0.0 || theoretical_mean <= 0.0 {
        return 0.5;
    }
    if wealth <= 0.0 {
        return 0.0;
    }
    // ln(w / E[w]) / sigma + sigma / 2 == (ln w - mu) / sigma
    let z = (wealth / theoretical_mean).ln() / sigma_log + sigma_log / 2.0;
    1.0 / (1.0 + (-LOGISTIC_NORMAL_SCALE * z).exp())
}

/// Quintile index 0 (poorest) ..= 4 (richest).
pub fn wealth_quintile(percentile: f64) -> u8 {
    let bucket = (percentile.clamp(0.0, 1.0) * f64::from(QUINTILES)).floor() as u8;
    bucket.min(QUINTILES - 1)
}

/// Strength of the regime-B incentive as a share of the average budget:
/// mean savings rate plus the weekly token reward value.
pub fn incentive_strength(params: &SimulationParams) -> f64 {
    let savings = (params.group_buy_savings_percent + params.local_production_savings_percent) / 2.0;
    let token_share = if params.weekly_food_budget_avg > 0.0 {
        params.token_reward_per_week_avg * params.token_usd_value / params.weekly_food_budget_avg
    } else {
        0.0
    };
    savings + token_share
}

/// Signed adjustment to a member's drawn propensity by wealth position.
///
/// Poorer members pull back under high inequality, except that under extreme
/// inequality with strong incentives they lean in. Richer members pull back
/// unless incentives are strong.
pub fn propensity_offset(quintile: u8, inequality: f64, strong_incentive: bool) -> f64 {
    let extreme = inequality > EXTREME_INEQUALITY_LEVEL;
    let high = inequality > HIGH_INEQUALITY_LEVEL;
    match quintile {
        0 if extreme && strong_incentive => 0.05,
        1 if extreme && strong_incentive => 0.03,
        0 if high => -0.10 * inequality,
        1 if high => -0.05 * inequality,
        3 if !strong_incentive => -0.05 * inequality,
        4 if !strong_incentive => -0.10 * inequality,
        _ => 0.0,
    }
}

fn normal(mean: f64, std_dev: f64, what: &str) -> Result<Normal<f64>, SimError> {
    Normal::new(mean, std_dev)
        .map_err(|e| SimError::Initialization(format!("{what} distribution N({mean}, {std_dev}): {e}")))
}

/// Build the initial population of `params.num_members`.
pub fn build_population<R: Rng + ?Sized>(
    params: &SimulationParams,
    rng: &mut R,
) -> Result<Vec<Member>, SimError> {
    if params.num_members == 0 {
        return Err(SimError::Initialization("population size must be positive".into()));
    }
    let n = u32::try_from(params.num_members)
        .map_err(|_| SimError::Initialization(format!("population {} too large", params.num_members)))?;

    let wealth_dist = LogNormal::new(params.initial_wealth_mean_log, params.initial_wealth_sigma_log)
        .map_err(|e| SimError::Initialization(format!("initial wealth distribution: {e}")))?;
    let budget_dist = normal(params.weekly_food_budget_avg, params.weekly_food_budget_stddev, "budget")?;
    let propensity_dist =
        normal(params.percent_spend_internal_avg, params.percent_spend_internal_stddev, "propensity")?;
    let income_dist = normal(params.weekly_income_avg, params.weekly_income_stddev, "income")?;

    let wealths: Vec<f64> = (0..n).map(|_| wealth_dist.sample(rng)).collect();

    let theoretical_mean = params.theoretical_mean_wealth();
    let sigma = params.initial_wealth_sigma_log;
    let inequality = inequality_level(sigma);
    let strong = incentive_strength(params) >= STRONG_INCENTIVE;

    let members = wealths
        .into_iter()
        .zip(0..n)
        .map(|(wealth, id)| {
            let quintile = wealth_quintile(approximate_percentile(wealth, theoretical_mean, sigma));
            let initial_wealth = wealth.max(0.0);

            let budget = budget_dist.sample(rng).max(params.min_weekly_budget);
            let drawn_propensity = propensity_dist.sample(rng);
            let propensity =
                (drawn_propensity + propensity_offset(quintile, inequality, strong)).clamp(0.0, 1.0);
            let income = income_dist.sample(rng).max(params.min_weekly_income);
            let token_usage_rate = rng.gen::<f64>() * MAX_INITIAL_TOKEN_USAGE;

            Member {
                id,
                initial_wealth,
                wealth_a: initial_wealth,
                cash_balance: initial_wealth,
                token_balance: 0.0,
                wealth_b: initial_wealth,
                weekly_food_budget: budget,
                weekly_income: income,
                propensity,
                internal_transaction_count: 0,
                token_usage_rate,
            }
        })
        .collect();

    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_inequality_level_range() {
        assert_eq!(inequality_level(0.2), 0.0);
        assert_eq!(inequality_level(0.3), 0.0);
        assert!((inequality_level(0.75) - 0.5).abs() < 1e-12);
        assert_eq!(inequality_level(2.0), 1.0);
    }

    #[test]
    fn test_percentile_at_median_is_half() {
        let p = SimulationParams::default();
        let median = p.initial_wealth_mean_log.exp();
        let pct = approximate_percentile(median, p.theoretical_mean_wealth(), p.initial_wealth_sigma_log);
        assert!((pct - 0.5).abs() < 1e-9);
        assert_eq!(wealth_quintile(pct), 2);
    }

    #[test]
    fn test_quintile_buckets() {
        assert_eq!(wealth_quintile(0.0), 0);
        assert_eq!(wealth_quintile(0.19), 0);
        assert_eq!(wealth_quintile(0.2), 1);
        assert_eq!(wealth_quintile(0.85), 4);
        assert_eq!(wealth_quintile(1.0), 4);
    }

    #[test]
    fn test_incentive_strength() {
        // 0.20 savings + 0.5 * 2 / 75 tokens
        let s = incentive_strength(&SimulationParams::default());
        assert!((s - (0.20 + 1.0 / 75.0)).abs() < 1e-12);
        assert!(s < STRONG_INCENTIVE);

        let generous = SimulationParams { token_reward_per_week_avg: 5.0, ..Default::default() };
        assert!(incentive_strength(&generous) >= STRONG_INCENTIVE);
    }

    #[test]
    fn test_propensity_offsets() {
        // Low inequality: nobody moves unless rich and weakly incentivised
        assert_eq!(propensity_offset(0, 0.2, false), 0.0);
        assert_eq!(propensity_offset(2, 0.9, false), 0.0);
        assert!((propensity_offset(4, 0.2, false) + 0.02).abs() < 1e-12);
        assert_eq!(propensity_offset(4, 0.9, true), 0.0);

        // High but not extreme inequality: the poor pull back
        assert!((propensity_offset(0, 0.6, true) + 0.06).abs() < 1e-12);
        assert!((propensity_offset(1, 0.6, false) + 0.03).abs() < 1e-12);

        // Extreme inequality with strong incentives: the poor lean in
        assert_eq!(propensity_offset(0, 0.9, true), 0.05);
        assert_eq!(propensity_offset(1, 0.9, true), 0.03);
        assert!((propensity_offset(0, 0.9, false) + 0.09).abs() < 1e-12);
    }

    #[test]
    fn test_population_respects_floors() {
        let params = SimulationParams {
            num_members: 200,
            weekly_income_avg: 10.0,
            weekly_income_stddev: 50.0,
            min_weekly_income: 5.0,
            weekly_food_budget_stddev: 60.0,
            ..SimulationParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let members = build_population(&params, &mut rng).unwrap();
        assert_eq!(members.len(), 200);
        for (i, m) in members.iter().enumerate() {
            assert_eq!(m.id as usize, i);
            assert!(m.weekly_income >= 5.0);
            assert!(m.weekly_food_budget >= 20.0);
            assert!((0.0..=1.0).contains(&m.propensity));
            assert!((0.0..0.1).contains(&m.token_usage_rate));
            assert!(m.initial_wealth > 0.0);
            assert_eq!(m.cash_balance, m.initial_wealth);
            assert_eq!(m.wealth_a, m.initial_wealth);
            assert_eq!(m.wealth_b, m.initial_wealth);
            assert_eq!(m.token_balance, 0.0);
            assert_eq!(m.internal_transaction_count, 0);
        }
    }

    #[test]
    fn test_population_is_reproducible() {
        let params = SimulationParams::default();
        let a = build_population(&params, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        let b = build_population(&params, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        let c = build_population(&params, &mut ChaCha8Rng::seed_from_u64(6)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_zero_population_is_fatal() {
        let params = SimulationParams { num_members: 0, ..Default::default() };
        let err = build_population(&params, &mut ChaCha8Rng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, SimError::Initialization(_)));
    }

    #[test]
    fn test_bad_distribution_is_fatal() {
        let params = SimulationParams { weekly_income_stddev: f64::NAN, ..Default::default() };
        let err = build_population(&params, &mut ChaCha8Rng::seed_from_u64(1)).unwrap_err();
        assert!(err.to_string().contains("income"));
    }
}

// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Cooperative Economy Simulation Engine - Weekly Metrics Aggregator
//
// Turns one week's population snapshot into a WeeklyMetrics record:
// distributional statistics for both regimes, composite community indices
// over member fields, and relative trends against the previous record.

use crate::params::SimulationParams;
use crate::stats;
use crate::types::{Member, Trends, WeeklyMetrics};

const WEEKS_PER_YEAR: u32 = 52;
const WEEKS_PER_QUARTER: u32 = 13;
/// Largest possible population std-dev of values confined to [0, 1].
const MAX_UNIT_STD_DEV: f64 = 0.5;

// ---------------------------------------------------------------------------
// Population aggregates
// ---------------------------------------------------------------------------

/// Member-field aggregates the composite indices are built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationAggregates {
    pub avg_propensity: f64,
    pub propensity_std_dev: f64,
    pub avg_token_usage: f64,
    /// 1 - Gini of token usage rates.
    pub token_usage_evenness: f64,
    /// Share of members holding any tokens.
    pub token_adoption: f64,
    pub avg_token_value: f64,
    /// Std-dev / mean of regime-B wealth (0 when the mean is ~0).
    pub wealth_b_cv: f64,
    /// Share of members at or above the poverty line under regime B.
    pub above_poverty_share: f64,
    /// Internal transactions per member per elapsed week.
    pub internal_tx_rate: f64,
}

impl PopulationAggregates {
    pub fn collect(members: &[Member], week: u32, params: &SimulationParams) -> Self {
        if members.is_empty() {
            return Self::default();
        }
        let n = members.len() as f64;
        let eps = params.calibration.epsilon;

        let propensities: Vec<f64> = members.iter().map(|m| m.propensity).collect();
        let usage: Vec<f64> = members.iter().map(|m| m.token_usage_rate).collect();
        let wealth_b: Vec<f64> = members.iter().map(|m| m.wealth_b).collect();

        let mean_b = stats::mean(&wealth_b);
        let wealth_b_cv = if mean_b > eps { stats::std_dev(&wealth_b) / mean_b } else { 0.0 };

        let holders = members.iter().filter(|m| m.token_balance > 0.0).count() as f64;
        let avg_tx = members.iter().map(|m| f64::from(m.internal_transaction_count)).sum::<f64>() / n;

        Self {
            avg_propensity: stats::mean(&propensities),
            propensity_std_dev: stats::std_dev(&propensities),
            avg_token_usage: stats::mean(&usage),
            token_usage_evenness: 1.0 - stats::gini(&usage),
            token_adoption: holders / n,
            avg_token_value: members.iter().map(|m| m.token_balance).sum::<f64>() / n * params.token_usd_value,
            wealth_b_cv,
            above_poverty_share: 1.0 - stats::share_below(&wealth_b, params.poverty_line()),
            internal_tx_rate: avg_tx / f64::from(week.max(1)),
        }
    }
}

/// Composite community indices for one week.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeIndices {
    pub wealth_mobility: f64,
    pub local_economy_strength: f64,
    pub community_resilience: f64,
    pub economic_velocity: f64,
    pub social_safety_net: f64,
    pub innovation_index: f64,
    pub sustainability_score: f64,
    pub community_engagement: f64,
    pub market_efficiency: f64,
    pub innovation_adoption: f64,
    pub wealth_mobility_score: f64,
    pub economic_diversity: f64,
    pub risk_resilience: f64,
}

impl CompositeIndices {
    pub fn from_aggregates(agg: &PopulationAggregates, params: &SimulationParams) -> Self {
        let cal = &params.calibration;
        let bounded = |v: f64| v.clamp(cal.index_floor, cal.index_ceiling);

        let safety_net = agg.above_poverty_share;
        let stability = (1.0 - agg.wealth_b_cv).clamp(0.0, 1.0);
        // 1 when spending splits evenly between internal and external
        let spending_balance = 1.0 - (2.0 * agg.avg_propensity - 1.0).abs();
        let propensity_dispersion = (agg.propensity_std_dev / MAX_UNIT_STD_DEV).min(1.0);

        // token holdings as a share of the poverty line
        let poverty_line = params.poverty_line();
        let wealth_mobility = if poverty_line > 0.0 {
            (agg.avg_token_value / poverty_line).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            wealth_mobility,
            local_economy_strength: agg.avg_propensity,
            community_resilience: safety_net,
            economic_velocity: agg.avg_propensity,
            social_safety_net: safety_net,
            innovation_index: (agg.token_adoption + agg.avg_propensity) / 2.0,
            sustainability_score: safety_net,
            community_engagement: agg.avg_propensity,
            market_efficiency: agg.internal_tx_rate.clamp(0.0, 1.0),
            innovation_adoption: agg.avg_token_usage,
            wealth_mobility_score: bounded((agg.token_usage_evenness + stability) / 2.0),
            economic_diversity: bounded((spending_balance + propensity_dispersion) / 2.0),
            risk_resilience: (safety_net + stability) / 2.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Trends
// ---------------------------------------------------------------------------

/// Relative change `(current - previous) / |previous|`, with a signed unit
/// fallback when `previous` is within `epsilon` of zero.
pub fn relative_change(previous: f64, current: f64, epsilon: f64) -> f64 {
    if previous.abs() > epsilon {
        (current - previous) / previous.abs()
    } else if current > previous {
        1.0
    } else if current < previous {
        -1.0
    } else {
        0.0
    }
}

fn compute_trends(previous: &WeeklyMetrics, current: &WeeklyMetrics, epsilon: f64) -> Trends {
    let t = |prev: f64, cur: f64| relative_change(prev, cur, epsilon);
    Trends {
        avg_wealth_b: t(previous.avg_wealth_b, current.avg_wealth_b),
        gini_b: t(previous.gini_b, current.gini_b),
        poverty_rate_b: t(previous.poverty_rate_b, current.poverty_rate_b),
        local_economy_strength: t(previous.local_economy_strength, current.local_economy_strength),
        community_resilience: t(previous.community_resilience, current.community_resilience),
        economic_velocity: t(previous.economic_velocity, current.economic_velocity),
        social_safety_net: t(previous.social_safety_net, current.social_safety_net),
        innovation_index: t(previous.innovation_index, current.innovation_index),
        sustainability_score: t(previous.sustainability_score, current.sustainability_score),
        community_engagement: t(previous.community_engagement, current.community_engagement),
    }
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Per-regime distribution summary.
struct Distribution {
    avg: f64,
    median: f64,
    total: f64,
    quintiles: [f64; 4],
    top10: f64,
    bottom10: f64,
    gini: f64,
    gap: f64,
    poverty_rate: f64,
}

impl Distribution {
    fn of(values: &[f64], params: &SimulationParams) -> Self {
        let cal = &params.calibration;
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let pct = |p: f64| stats::percentile_sorted(&sorted, p);
        Self {
            avg: stats::mean(values),
            median: pct(50.0),
            total: values.iter().sum(),
            quintiles: [pct(20.0), pct(40.0), pct(60.0), pct(80.0)],
            top10: pct(90.0),
            bottom10: pct(10.0),
            gini: stats::gini(values),
            gap: stats::wealth_gap(values, cal.wealth_gap_min_population, cal.epsilon),
            poverty_rate: stats::share_below(values, params.poverty_line()),
        }
    }
}

/// Stateful aggregator: remembers the previous record for trend computation.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    previous: Option<WeeklyMetrics>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<&WeeklyMetrics> {
        self.previous.as_ref()
    }

    /// Aggregate one week. `week` is 1-based.
    pub fn compute(&mut self, week: u32, members: &[Member], params: &SimulationParams) -> WeeklyMetrics {
        let cal = &params.calibration;
        let wealth_a: Vec<f64> = members.iter().map(|m| m.wealth_a).collect();
        let wealth_b: Vec<f64> = members.iter().map(|m| m.wealth_b).collect();

        let a = Distribution::of(&wealth_a, params);
        let b = Distribution::of(&wealth_b, params);
        let composites = CompositeIndices::from_aggregates(&PopulationAggregates::collect(members, week, params), params);

        let mut metrics = WeeklyMetrics {
            week,
            year: week / WEEKS_PER_YEAR + 1,
            quarter: (week % WEEKS_PER_YEAR) / WEEKS_PER_QUARTER + 1,

            avg_wealth_a: a.avg,
            avg_wealth_b: b.avg,
            median_wealth_a: a.median,
            median_wealth_b: b.median,
            total_wealth_a: a.total,
            total_wealth_b: b.total,

            wealth_quintiles_a: a.quintiles,
            wealth_quintiles_b: b.quintiles,
            top10_percent_a: a.top10,
            top10_percent_b: b.top10,
            bottom10_percent_a: a.bottom10,
            bottom10_percent_b: b.bottom10,

            gini_a: a.gini,
            gini_b: b.gini,
            wealth_gap_a: a.gap,
            wealth_gap_b: b.gap,
            bottom20_pct_share: stats::bottom_share(&wealth_b, cal.wealth_gap_min_population, cal.epsilon),
            poverty_rate_a: a.poverty_rate,
            poverty_rate_b: b.poverty_rate,

            wealth_mobility: composites.wealth_mobility,
            local_economy_strength: composites.local_economy_strength,
            community_resilience: composites.community_resilience,
            economic_velocity: composites.economic_velocity,
            social_safety_net: composites.social_safety_net,
            innovation_index: composites.innovation_index,
            sustainability_score: composites.sustainability_score,
            community_engagement: composites.community_engagement,
            market_efficiency: composites.market_efficiency,
            innovation_adoption: composites.innovation_adoption,
            wealth_mobility_score: composites.wealth_mobility_score,
            economic_diversity: composites.economic_diversity,
            risk_resilience: composites.risk_resilience,

            trends: Trends::default(),
        };

        if let Some(prev) = &self.previous {
            metrics.trends = compute_trends(prev, &metrics, cal.epsilon);
        }
        self.previous = Some(metrics.clone());
        metrics
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

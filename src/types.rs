// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Cooperative Economy Simulation Engine - Type Definitions

use serde::{Deserialize, Deserializer, Serialize};

use crate::narrative::Narrative;
use crate::params::SimulationParams;

// ─── Member ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: u32,
    pub initial_wealth: f64,
    /// Wealth under the traditional regime.
    pub wealth_a: f64,
    /// Cooperative-regime cash balance.
    pub cash_balance: f64,
    pub token_balance: f64,
    /// Cooperative-regime wealth: cash + tokens x token value.
    pub wealth_b: f64,
    pub weekly_food_budget: f64,
    pub weekly_income: f64,
    /// Share of the food budget spent inside the cooperative, in [0, 1].
    pub propensity: f64,
    pub internal_transaction_count: u32,
    pub token_usage_rate: f64,
}

impl Member {
    pub fn label(&self) -> String {
        format!("M_{}", self.id)
    }

    pub fn compute_wealth_b(&self, token_usd_value: f64) -> f64 {
        self.cash_balance + self.token_balance * token_usd_value
    }

    pub fn snapshot(&self) -> MemberSnapshot {
        MemberSnapshot {
            id: self.label(),
            income: self.weekly_income,
            budget: self.weekly_food_budget,
            wealth_a: self.wealth_a,
            wealth_b: self.wealth_b,
            cash_balance: self.cash_balance,
            token_balance: self.token_balance,
        }
    }
}

// ─── Trends ─────────────────────────────────────────────────────────────────

/// Relative week-over-week change for the tracked subset of metrics.
/// All zero on week 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trends {
    pub avg_wealth_b: f64,
    pub gini_b: f64,
    pub poverty_rate_b: f64,
    pub local_economy_strength: f64,
    pub community_resilience: f64,
    pub economic_velocity: f64,
    pub social_safety_net: f64,
    pub innovation_index: f64,
    pub sustainability_score: f64,
    pub community_engagement: f64,
}

impl Trends {
    pub fn values(&self) -> [f64; 10] {
        [
            self.avg_wealth_b,
            self.gini_b,
            self.poverty_rate_b,
            self.local_economy_strength,
            self.community_resilience,
            self.economic_velocity,
            self.social_safety_net,
            self.innovation_index,
            self.sustainability_score,
            self.community_engagement,
        ]
    }
}

// ─── WeeklyMetrics ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMetrics {
    pub week: u32,
    pub year: u32,
    pub quarter: u32,

    pub avg_wealth_a: f64,
    pub avg_wealth_b: f64,
    pub median_wealth_a: f64,
    pub median_wealth_b: f64,
    pub total_wealth_a: f64,
    pub total_wealth_b: f64,

    /// 20th, 40th, 60th, 80th percentiles.
    pub wealth_quintiles_a: [f64; 4],
    pub wealth_quintiles_b: [f64; 4],
    pub top10_percent_a: f64,
    pub top10_percent_b: f64,
    pub bottom10_percent_a: f64,
    pub bottom10_percent_b: f64,

    pub gini_a: f64,
    pub gini_b: f64,
    /// Top-20% mean / bottom-20% mean; `f64::INFINITY` when undefined.
    /// JSON has no infinity, so the sentinel is written as `null`.
    #[serde(deserialize_with = "gap_or_infinite")]
    pub wealth_gap_a: f64,
    #[serde(deserialize_with = "gap_or_infinite")]
    pub wealth_gap_b: f64,
    pub bottom20_pct_share: f64,
    pub poverty_rate_a: f64,
    pub poverty_rate_b: f64,

    // Composite indices
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

    pub trends: Trends,
}

fn gap_or_infinite<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

// ─── KeyEvent ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    EqualityImprovement,
    PovertyReduction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub week: u32,
    pub kind: EventKind,
    pub description: String,
}

// ─── Results ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    pub id: String,
    pub income: f64,
    pub budget: f64,
    pub wealth_a: f64,
    pub wealth_b: f64,
    pub cash_balance: f64,
    pub token_balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResults {
    pub history: Vec<WeeklyMetrics>,
    pub final_members: Vec<MemberSnapshot>,
    pub key_events: Vec<KeyEvent>,
    pub summary: Narrative,
    pub params: SimulationParams,
    /// Seed actually used (drawn from entropy when `params.seed` is `None`).
    pub seed: u64,
}

impl SimulationResults {
    pub fn final_week(&self) -> Option<&WeeklyMetrics> {
        self.history.last()
    }
}

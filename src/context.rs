// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Cooperative Economy Simulation Engine - Week Context
//
// Population-wide conditions frozen at the start of each week. Every
// per-member transition in that week reads the same context, so members
// can be advanced in any order (or in parallel) with identical results.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::params::SimulationParams;
use crate::scale::CommunityScale;
use crate::stats;
use crate::stress;
use crate::types::Member;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekContext {
    /// 1-based week index.
    pub week: u32,
    pub seed: u64,
    pub population: usize,

    /// Active shock multipliers for this week.
    pub income_factor: f64,
    pub cost_factor: f64,
    /// Configured averages after shocks.
    pub avg_income: f64,
    pub avg_budget: f64,

    pub stress_level: f64,
    pub severe_stress: bool,

    pub avg_propensity: f64,
    /// Current regime-B Gini, the inequality signal for network effects.
    pub inequality_gini: f64,
    /// Mean regime-B wealth, the reference for mutual-aid vulnerability.
    pub avg_wealth_b: f64,

    pub scale: CommunityScale,
}

impl WeekContext {
    pub fn new(params: &SimulationParams, members: &[Member], week: u32, seed: u64) -> Self {
        let (income_factor, cost_factor) = params.shock_factors(week);
        let avg_income = params.weekly_income_avg * income_factor;
        let avg_budget = params.weekly_food_budget_avg * cost_factor;
        let stress_level =
            stress::economic_stress_level(avg_income, avg_budget, params.initial_wealth_sigma_log);

        let propensities: Vec<f64> = members.iter().map(|m| m.propensity).collect();
        let wealth_b: Vec<f64> = members.iter().map(|m| m.wealth_b).collect();

        Self {
            week,
            seed,
            population: members.len(),
            income_factor,
            cost_factor,
            avg_income,
            avg_budget,
            stress_level,
            severe_stress: stress_level > params.calibration.severe_stress_threshold,
            avg_propensity: stats::mean(&propensities),
            inequality_gini: stats::gini(&wealth_b),
            avg_wealth_b: stats::mean(&wealth_b),
            scale: CommunityScale::for_population(members.len()),
        }
    }

    /// Independent generator for one member in this week.
    pub fn member_rng(&self, member_id: u32) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(derive_seed(self.seed, self.week, member_id))
    }
}

/// Mix (seed, week, member) into a 64-bit stream seed (splitmix64 finalizer).
pub fn derive_seed(seed: u64, week: u32, member_id: u32) -> u64 {
    let mut z = seed
        ^ (u64::from(week)).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (u64::from(member_id)).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Cooperative Economy Simulation Engine - Economies of Scale
//
// Group buying follows an S-curve in community size with a coordination
// penalty for very large communities. Local production follows a bell
// curve in log-size, peaking at a mid-size community.

use serde::{Deserialize, Serialize};

/// Community size at the logistic midpoint of group-buying efficiency.
const GROUP_BUY_MIDPOINT: f64 = 30.0;
/// Logistic steepness (members per e-fold).
const GROUP_BUY_STEEPNESS: f64 = 10.0;
/// Size above which coordination costs start eroding group-buy savings.
const COORDINATION_THRESHOLD: f64 = 500.0;
const COORDINATION_SCALE: f64 = 5000.0;
const MAX_COORDINATION_PENALTY: f64 = 0.2;

/// Community size where local production is most efficient.
const LOCAL_PRODUCTION_PEAK: f64 = 150.0;
/// Bell width in natural-log units of community size.
const LOCAL_PRODUCTION_WIDTH: f64 = 1.0;
/// Below this size local production runs at no less than the floor.
const SMALL_COMMUNITY_SIZE: usize = 20;
const SMALL_COMMUNITY_FLOOR: f64 = 0.3;

/// Group-buy efficiency in (0, 1] for a community of `n` members.
pub fn group_buy_scale(n: usize) -> f64 {
    let size = n as f64;
    let logistic = 1.0 / (1.0 + (-(size - GROUP_BUY_MIDPOINT) / GROUP_BUY_STEEPNESS).exp());
    let penalty = if size > COORDINATION_THRESHOLD {
        ((size - COORDINATION_THRESHOLD) / COORDINATION_SCALE).min(MAX_COORDINATION_PENALTY)
    } else {
        0.0
    };
    logistic * (1.0 - penalty)
}

/// Local-production efficiency in [0, 1] for a community of `n` members.
pub fn local_production_scale(n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let log_distance = (n as f64 / LOCAL_PRODUCTION_PEAK).ln();
    let bell = (-(log_distance * log_distance) / (2.0 * LOCAL_PRODUCTION_WIDTH * LOCAL_PRODUCTION_WIDTH)).exp();
    if n < SMALL_COMMUNITY_SIZE {
        bell.max(SMALL_COMMUNITY_FLOOR)
    } else {
        bell
    }
}

/// Scale-adjusted savings rates for one community size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommunityScale {
    pub group_buy_factor: f64,
    pub local_production_factor: f64,
}

impl CommunityScale {
    pub fn for_population(n: usize) -> Self {
        Self {
            group_buy_factor: group_buy_scale(n),
            local_production_factor: local_production_scale(n),
        }
    }

    /// Mean of the two adjusted savings rates.
    pub fn average_savings_rate(&self, group_buy_rate: f64, local_production_rate: f64) -> f64 {
        (group_buy_rate * self.group_buy_factor + local_production_rate * self.local_production_factor) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_buy_is_s_shaped() {
        assert!(group_buy_scale(1) < 0.1);
        assert!((group_buy_scale(30) - 0.5).abs() < 1e-12);
        assert!(group_buy_scale(50) > 0.85);
        assert!(group_buy_scale(200) > 0.99);
        assert!(group_buy_scale(10) < group_buy_scale(20));
    }

    #[test]
    fn test_group_buy_coordination_penalty() {
        let at_threshold = group_buy_scale(500);
        let large = group_buy_scale(1500);
        let huge = group_buy_scale(100_000);
        assert!(large < at_threshold);
        // 1000 / 5000 = 0.2 penalty, the cap
        assert!((large - at_threshold * 0.8).abs() < 1e-6);
        assert!((huge - large).abs() < 1e-6);
    }

    #[test]
    fn test_local_production_peaks_mid_size() {
        assert!((local_production_scale(150) - 1.0).abs() < 1e-12);
        assert!(local_production_scale(50) < 1.0);
        assert!(local_production_scale(1000) < local_production_scale(300));
        assert!(local_production_scale(150) > local_production_scale(50));
    }

    #[test]
    fn test_local_production_small_floor() {
        assert_eq!(local_production_scale(1), SMALL_COMMUNITY_FLOOR);
        assert!(local_production_scale(5) >= SMALL_COMMUNITY_FLOOR);
        assert_eq!(local_production_scale(0), 0.0);
    }

    #[test]
    fn test_average_savings_rate() {
        let scale = CommunityScale { group_buy_factor: 1.0, local_production_factor: 1.0 };
        assert!((scale.average_savings_rate(0.15, 0.25) - 0.20).abs() < 1e-12);

        let scale = CommunityScale::for_population(50);
        let rate = scale.average_savings_rate(0.15, 0.25);
        assert!(rate > 0.0 && rate < 0.20);
    }
}

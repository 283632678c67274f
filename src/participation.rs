// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Cooperative Economy Simulation Engine - Participation Network Effects

use serde::{Deserialize, Serialize};

/// Average propensity below which the community is weakly cooperative.
const LOW_BAND_CEILING: f64 = 0.4;
/// Average propensity at or above which the community is strongly cooperative.
const HIGH_BAND_FLOOR: f64 = 0.7;
/// A member's propensity counts for at most twice the community average.
const MAX_RELATIVE_PROPENSITY: f64 = 2.0;

/// Regime-B Gini above which inequality erodes network effects.
const HIGH_INEQUALITY_GINI: f64 = 0.4;
const MAX_INEQUALITY_REDUCTION: f64 = 0.2;
/// Fraction of the inequality reduction that survives in a high-participation community.
const HIGH_PARTICIPATION_OFFSET: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CooperationBand {
    Low,
    Moderate,
    High,
}

impl CooperationBand {
    pub fn classify(avg_propensity: f64) -> Self {
        if avg_propensity < LOW_BAND_CEILING {
            Self::Low
        } else if avg_propensity < HIGH_BAND_FLOOR {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Map relative propensity (member / average) into a savings multiplier.
    fn multiplier(self, relative: f64) -> f64 {
        match self {
            Self::Low => (0.5 + 0.5 * relative).clamp(0.3, 1.0),
            Self::Moderate => (0.8 + 0.4 * (relative - 1.0)).clamp(0.6, 1.3),
            Self::High => (1.1 + 0.3 * (relative - 1.0)).clamp(0.9, 1.5),
        }
    }
}

/// Network-effect multiplier applied to a member's internal savings rate.
pub fn participation_multiplier(propensity: f64, avg_propensity: f64, inequality_gini: f64) -> f64 {
    let band = CooperationBand::classify(avg_propensity);
    let relative = if avg_propensity > f64::EPSILON {
        (propensity / avg_propensity).clamp(0.0, MAX_RELATIVE_PROPENSITY)
    } else {
        1.0
    };
    let base = band.multiplier(relative);

    if inequality_gini <= HIGH_INEQUALITY_GINI {
        return base;
    }
    let severity = ((inequality_gini - HIGH_INEQUALITY_GINI) / (1.0 - HIGH_INEQUALITY_GINI)).min(1.0);
    let mut reduction = MAX_INEQUALITY_REDUCTION * severity;
    if band == CooperationBand::High {
        reduction *= HIGH_PARTICIPATION_OFFSET;
    }
    base * (1.0 - reduction)
}

/// Token reward multiplier from the member's own participation, in [0.5, 1.5].
pub fn individual_token_multiplier(propensity: f64) -> f64 {
    0.5 + propensity.clamp(0.0, 1.0)
}

/// Token reward multiplier from community-wide cooperation, in [0.8, 1.2].
pub fn cooperation_token_multiplier(avg_propensity: f64) -> f64 {
    0.8 + 0.4 * avg_propensity.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_classification() {
        assert_eq!(CooperationBand::classify(0.1), CooperationBand::Low);
        assert_eq!(CooperationBand::classify(0.4), CooperationBand::Moderate);
        assert_eq!(CooperationBand::classify(0.69), CooperationBand::Moderate);
        assert_eq!(CooperationBand::classify(0.7), CooperationBand::High);
    }

    #[test]
    fn test_average_member_per_band() {
        assert!((participation_multiplier(0.2, 0.2, 0.3) - 1.0).abs() < 1e-12);
        assert!((participation_multiplier(0.6, 0.6, 0.3) - 0.8).abs() < 1e-12);
        assert!((participation_multiplier(0.8, 0.8, 0.3) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_multiplier_bounds_per_band() {
        // Non-participant in each band hits the band floor
        assert!((participation_multiplier(0.0, 0.2, 0.0) - 0.5).abs() < 1e-12);
        assert!((participation_multiplier(0.0, 0.6, 0.0) - 0.6).abs() < 1e-12);
        assert!((participation_multiplier(0.0, 0.8, 0.0) - 0.9).abs() < 1e-12);
        // Twice-average participant in the moderate band is capped at 1.2
        assert!((participation_multiplier(1.0, 0.5, 0.0) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_multiplier_grows_with_propensity() {
        let low = participation_multiplier(0.3, 0.6, 0.3);
        let high = participation_multiplier(0.9, 0.6, 0.3);
        assert!(high > low);
    }

    #[test]
    fn test_zero_average_propensity() {
        assert!((participation_multiplier(0.0, 0.0, 0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inequality_reduces_multiplier() {
        let equal = participation_multiplier(0.6, 0.6, 0.3);
        let unequal = participation_multiplier(0.6, 0.6, 0.7);
        // severity 0.5 -> 10% reduction
        assert!((unequal - equal * 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_high_participation_offsets_inequality() {
        let equal = participation_multiplier(0.8, 0.8, 0.3);
        let unequal = participation_multiplier(0.8, 0.8, 1.0);
        // full severity halved -> 10% reduction
        assert!((unequal - equal * 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_token_multipliers() {
        assert_eq!(individual_token_multiplier(0.0), 0.5);
        assert_eq!(individual_token_multiplier(1.0), 1.5);
        assert_eq!(individual_token_multiplier(3.0), 1.5);
        assert!((cooperation_token_multiplier(0.5) - 1.0).abs() < 1e-12);
        assert!((cooperation_token_multiplier(1.0) - 1.2).abs() < 1e-12);
    }
}

// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Cooperative Economy Simulation Engine - Economic Stress Model
//
// Stress is a scalar in [0, 1] derived from the income/expense pressure of
// the configured population. It drives cost inflation and survival-mode
// spending in the traditional regime and mutual aid in the cooperative one.

/// Income-to-budget ratio at or above which there is no ratio-driven stress.
const COMFORT_RATIO: f64 = 2.0;
/// Average weekly income below which absolute poverty adds stress.
const LOW_INCOME_THRESHOLD: f64 = 100.0;
const LOW_INCOME_WEIGHT: f64 = 0.2;
/// Log-sigma of initial wealth above which inequality adds stress.
const INEQUALITY_SIGMA_THRESHOLD: f64 = 0.8;
const INEQUALITY_WEIGHT: f64 = 0.25;
const INEQUALITY_STRESS_CAP: f64 = 0.15;

/// Maximum cost inflation under full stress (25%).
const MAX_COST_INFLATION: f64 = 0.25;
/// Below-average earners are up to this much more exposed to inflation.
const MAX_EXTRA_VULNERABILITY: f64 = 0.5;

/// Share of current wealth a member will draw on when stress is zero.
const BASE_WEALTH_DRAW: f64 = 0.1;
/// Additional wealth drawn per unit of stress.
const STRESS_WEALTH_DRAW: f64 = 0.3;
/// Wealth share drawn under severe stress.
const SEVERE_WEALTH_DRAW: f64 = 0.5;
/// Minimum viable spending under severe stress, as a fraction of budget.
pub const SURVIVAL_SPENDING_FLOOR: f64 = 0.8;

/// Mutual-aid discount at full stress for a fully vulnerable member.
const MAX_MUTUAL_AID_DISCOUNT: f64 = 0.2;
/// Mutual aid never pushes cooperative spending below this fraction of budget.
pub const MUTUAL_AID_SPENDING_FLOOR: f64 = 0.6;

/// Economic stress level in [0, 1].
///
/// Rises linearly as `avg_income / avg_budget` falls below 2.0, with extra
/// contributions for low absolute income and high initial wealth inequality.
pub fn economic_stress_level(avg_income: f64, avg_budget: f64, wealth_sigma_log: f64) -> f64 {
    let ratio_stress = if avg_budget <= 0.0 {
        0.0
    } else {
        let ratio = avg_income / avg_budget;
        ((COMFORT_RATIO - ratio) / COMFORT_RATIO).max(0.0)
    };

    let low_income_stress = if avg_income < LOW_INCOME_THRESHOLD {
        (LOW_INCOME_THRESHOLD - avg_income.max(0.0)) / LOW_INCOME_THRESHOLD * LOW_INCOME_WEIGHT
    } else {
        0.0
    };

    let inequality_stress = if wealth_sigma_log > INEQUALITY_SIGMA_THRESHOLD {
        ((wealth_sigma_log - INEQUALITY_SIGMA_THRESHOLD) * INEQUALITY_WEIGHT).min(INEQUALITY_STRESS_CAP)
    } else {
        0.0
    };

    (ratio_stress + low_income_stress + inequality_stress).clamp(0.0, 1.0)
}

/// Individual exposure to price pressure: 1.0 at or above average income,
/// up to 1.5 for members with no income.
pub fn income_vulnerability(income: f64, avg_income: f64) -> f64 {
    if avg_income <= 0.0 || income >= avg_income {
        return 1.0;
    }
    1.0 + MAX_EXTRA_VULNERABILITY * (avg_income - income.max(0.0)) / avg_income
}

/// Multiplier applied to nominal spending under stress, in [1.0, 1.25].
pub fn cost_inflation_factor(stress: f64, vulnerability: f64) -> f64 {
    1.0 + (MAX_COST_INFLATION * stress * vulnerability).clamp(0.0, MAX_COST_INFLATION)
}

/// Share of current wealth a stressed member is willing to spend this week.
pub fn wealth_draw_fraction(stress: f64, severe: bool) -> f64 {
    if severe {
        SEVERE_WEALTH_DRAW
    } else {
        BASE_WEALTH_DRAW + STRESS_WEALTH_DRAW * stress
    }
}

/// Traditional-regime spending requirement for one week.
///
/// Zero stress: exactly `budget`. Positive stress: inflated budget capped by
/// `income + draw x wealth`. Severe stress additionally enforces a floor of
/// 80% of budget regardless of affordability.
pub fn required_spending(
    budget: f64,
    income: f64,
    wealth: f64,
    avg_income: f64,
    stress: f64,
    severe: bool,
) -> f64 {
    if stress <= 0.0 {
        return budget;
    }
    let vulnerability = income_vulnerability(income, avg_income);
    let inflated = budget * cost_inflation_factor(stress, vulnerability);
    let affordable = income.max(0.0) + wealth_draw_fraction(stress, severe) * wealth.max(0.0);
    let required = inflated.min(affordable);
    if severe {
        required.max(SURVIVAL_SPENDING_FLOOR * budget)
    } else {
        required
    }
}

/// Wealth vulnerability in [0, 1]: how far a member sits below the
/// reference (average) cooperative wealth.
pub fn wealth_vulnerability(wealth: f64, reference_wealth: f64) -> f64 {
    if reference_wealth <= 0.0 {
        return 1.0;
    }
    (1.0 - wealth.max(0.0) / reference_wealth).clamp(0.0, 1.0)
}

/// Progressive mutual-aid discount in [0, 0.2].
pub fn mutual_aid_discount(stress: f64, vulnerability: f64) -> f64 {
    (MAX_MUTUAL_AID_DISCOUNT * stress * vulnerability).clamp(0.0, MAX_MUTUAL_AID_DISCOUNT)
}

/// Apply mutual aid to a cooperative cost. The discounted cost never falls
/// below 60% of nominal `budget`, unless it was already lower.
pub fn apply_mutual_aid(effective_cost: f64, budget: f64, discount: f64) -> f64 {
    let floor = effective_cost.min(MUTUAL_AID_SPENDING_FLOOR * budget);
    (effective_cost * (1.0 - discount)).max(floor)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

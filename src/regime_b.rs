// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Cooperative Economy Simulation Engine - Cooperative Economy Transition
//
// One week for one member under the cooperative regime:
//
//   1. credit income to the cash balance
//   2. split the (shocked) budget into internal and external spending
//   3. internal spending earns the scale-adjusted savings rate, boosted or
//      damped by the participation network effect
//   4. under severe stress, mutual aid discounts the bill for vulnerable members
//   5. pay the bill, then the cooperative fee, both capped by cash on hand
//   6. mint the weekly token reward
//
// All randomness comes from the member's own per-week stream.

use rand_distr::{Distribution, Normal};

use crate::context::WeekContext;
use crate::error::{check_state, floor_zero, Regime, TransitionError};
use crate::participation;
use crate::params::SimulationParams;
use crate::stress;
use crate::types::Member;

/// Savings can never make internal spending free.
const MAX_SAVINGS_RATE: f64 = 0.95;
/// EMA weight of the newest token-coverage observation.
const TOKEN_USAGE_EMA_WEIGHT: f64 = 0.1;

/// Effective internal savings rate for one member this week.
pub fn effective_savings_rate(member: &Member, params: &SimulationParams, ctx: &WeekContext) -> f64 {
    let base = ctx
        .scale
        .average_savings_rate(params.group_buy_savings_percent, params.local_production_savings_percent);
    let network = participation::participation_multiplier(member.propensity, ctx.avg_propensity, ctx.inequality_gini);
    (base * network).clamp(0.0, MAX_SAVINGS_RATE)
}

/// Cost of this week's food basket after savings and (under severe stress)
/// mutual aid. Returns `(cost, internal_spend)`.
pub fn effective_cost(member: &Member, params: &SimulationParams, ctx: &WeekContext) -> (f64, f64) {
    let budget = member.weekly_food_budget * ctx.cost_factor;
    let internal = budget * member.propensity;
    let external = budget * (1.0 - member.propensity);

    let savings_rate = effective_savings_rate(member, params, ctx);
    let mut cost = internal * (1.0 - savings_rate) + external;

    if ctx.severe_stress {
        let vulnerability = stress::wealth_vulnerability(member.wealth_b, ctx.avg_wealth_b);
        let discount = stress::mutual_aid_discount(ctx.stress_level, vulnerability);
        cost = stress::apply_mutual_aid(cost, budget, discount);
    }
    (cost, internal)
}

/// Weekly token reward after individual and community participation multipliers.
fn draw_token_reward(member: &Member, params: &SimulationParams, ctx: &WeekContext) -> Result<f64, TransitionError> {
    let dist = Normal::new(params.token_reward_per_week_avg, params.token_reward_stddev).map_err(|e| {
        TransitionError::Distribution { regime: Regime::Cooperative, reason: e.to_string() }
    })?;
    let mut rng = ctx.member_rng(member.id);
    let raw = dist.sample(&mut rng).max(0.0);
    Ok(raw
        * participation::individual_token_multiplier(member.propensity)
        * participation::cooperation_token_multiplier(ctx.avg_propensity))
}

/// Advance one member's cooperative-economy state by one week.
pub fn advance(member: &Member, params: &SimulationParams, ctx: &WeekContext) -> Result<Member, TransitionError> {
    let income = member.weekly_income * ctx.income_factor;
    let mut cash = member.cash_balance + income;

    let (cost, internal) = effective_cost(member, params, ctx);
    let spent = cost.min(cash);
    cash = floor_zero(cash - spent);

    let fee = params.weekly_coop_fee.min(cash);
    cash = floor_zero(cash - fee);

    let reward = draw_token_reward(member, params, ctx)?;
    let cash_balance = check_state(Regime::Cooperative, "cash_balance", cash)?;
    let token_balance = check_state(Regime::Cooperative, "token_balance", member.token_balance + reward)?;

    let internal_transaction_count = if internal > 0.0 && spent > 0.0 {
        member.internal_transaction_count.saturating_add(1)
    } else {
        member.internal_transaction_count
    };

    let token_usage_rate = if spent > 0.0 {
        let coverage = (reward * params.token_usd_value / spent).min(1.0);
        (1.0 - TOKEN_USAGE_EMA_WEIGHT) * member.token_usage_rate + TOKEN_USAGE_EMA_WEIGHT * coverage
    } else {
        member.token_usage_rate
    };

    let mut next = Member {
        cash_balance,
        token_balance,
        internal_transaction_count,
        token_usage_rate,
        ..member.clone()
    };
    next.wealth_b = check_state(Regime::Cooperative, "wealth_b", next.compute_wealth_b(params.token_usd_value))?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: u32, wealth: f64, propensity: f64) -> Member {
        Member {
            id,
            initial_wealth: wealth,
            wealth_a: wealth,
            cash_balance: wealth,
            token_balance: 0.0,
            wealth_b: wealth,
            weekly_food_budget: 75.0,
            weekly_income: 150.0,
            propensity,
            internal_transaction_count: 0,
            token_usage_rate: 0.05,
        }
    }

    fn population(n: u32, propensity: f64) -> Vec<Member> {
        (0..n).map(|id| member(id, 1000.0, propensity)).collect()
    }

    #[test]
    fn test_cooperative_week_beats_traditional_budget() {
        let params = SimulationParams { token_reward_stddev: 0.0, ..Default::default() };
        let members = population(50, 0.6);
        let ctx = WeekContext::new(&params, &members, 1, 3);
        let next = advance(&members[0], &params, &ctx).unwrap();

        let (cost, internal) = effective_cost(&members[0], &params, &ctx);
        assert!((internal - 45.0).abs() < 1e-9);
        assert!(cost < 75.0);
        // cash = 1000 + 150 - cost - fee
        assert!((next.cash_balance - (1150.0 - cost - 1.0)).abs() < 1e-9);
        // reward = 0.5 * 1.1 * 1.04 tokens
        assert!((next.token_balance - 0.5 * 1.1 * 1.04).abs() < 1e-9);
        assert!((next.wealth_b - (next.cash_balance + next.token_balance * 2.0)).abs() < 1e-9);
        assert!(next.wealth_b > 1000.0 + 150.0 - 75.0);
        assert_eq!(next.internal_transaction_count, 1);
        // Regime-A state untouched
        assert_eq!(next.wealth_a, members[0].wealth_a);
    }

    #[test]
    fn test_savings_rate_grows_with_propensity() {
        let params = SimulationParams::default();
        let members = population(50, 0.6);
        let ctx = WeekContext::new(&params, &members, 1, 3);
        let low = effective_savings_rate(&member(0, 1000.0, 0.2), &params, &ctx);
        let high = effective_savings_rate(&member(0, 1000.0, 1.0), &params, &ctx);
        assert!(low > 0.0);
        assert!(high > low);
        assert!(high <= MAX_SAVINGS_RATE);
    }

    #[test]
    fn test_zero_propensity_gets_no_internal_savings() {
        let params = SimulationParams::default();
        let members = population(50, 0.0);
        let ctx = WeekContext::new(&params, &members, 1, 3);
        let (cost, internal) = effective_cost(&members[0], &params, &ctx);
        assert_eq!(internal, 0.0);
        assert!((cost - 75.0).abs() < 1e-9);
        let next = advance(&members[0], &params, &ctx).unwrap();
        assert_eq!(next.internal_transaction_count, 0);
    }

    #[test]
    fn test_broke_member_pays_what_they_have() {
        let params = SimulationParams { weekly_coop_fee: 5.0, ..Default::default() };
        let mut m = member(0, 0.0, 0.6);
        m.weekly_income = 20.0;
        let ctx = WeekContext::new(&params, &[m.clone()], 1, 3);
        let next = advance(&m, &params, &ctx).unwrap();
        assert_eq!(next.cash_balance, 0.0);
        assert!(next.token_balance >= 0.0);
        assert!(next.wealth_b >= 0.0);
    }

    #[test]
    fn test_mutual_aid_under_severe_stress() {
        let params = SimulationParams { weekly_income_avg: 45.0, ..Default::default() };
        let mut members = population(10, 0.6);
        members[0].wealth_b = 0.0;
        members[0].cash_balance = 0.0;
        let ctx = WeekContext::new(&params, &members, 1, 3);
        assert!(ctx.severe_stress);

        let calm = WeekContext { severe_stress: false, ..ctx.clone() };
        let (aided, _) = effective_cost(&members[0], &params, &ctx);
        let (plain, _) = effective_cost(&members[0], &params, &calm);
        assert!(aided < plain);
        assert!(aided >= stress::MUTUAL_AID_SPENDING_FLOOR * 75.0 - 1e-9);

        // A member at or above average wealth gets no discount
        let (rich_aided, _) = effective_cost(&members[1], &params, &ctx);
        let (rich_plain, _) = effective_cost(&members[1], &params, &calm);
        assert!((rich_aided - rich_plain).abs() < 1e-9);
    }

    #[test]
    fn test_token_usage_rate_tracks_coverage() {
        let params = SimulationParams { token_reward_stddev: 0.0, ..Default::default() };
        let members = population(50, 0.6);
        let ctx = WeekContext::new(&params, &members, 1, 3);
        let next = advance(&members[0], &params, &ctx).unwrap();
        let (cost, _) = effective_cost(&members[0], &params, &ctx);
        let coverage = 0.5 * 1.1 * 1.04 * 2.0 / cost;
        assert!((next.token_usage_rate - (0.9 * 0.05 + 0.1 * coverage)).abs() < 1e-9);
    }

    #[test]
    fn test_reward_is_deterministic_per_member_and_week() {
        let params = SimulationParams::default();
        let members = population(5, 0.6);
        let ctx = WeekContext::new(&params, &members, 4, 77);
        let a = advance(&members[2], &params, &ctx).unwrap();
        let b = advance(&members[2], &params, &ctx).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_reward_distribution() {
        let params = SimulationParams { token_reward_stddev: -1.0, ..Default::default() };
        let members = population(5, 0.6);
        let ctx = WeekContext::new(&params, &members, 1, 1);
        assert!(matches!(
            advance(&members[0], &params, &ctx),
            Err(TransitionError::Distribution { regime: Regime::Cooperative, .. })
        ));
    }
}

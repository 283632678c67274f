// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Cooperative Economy Simulation Engine - Traditional Economy Transition

use crate::context::WeekContext;
use crate::error::{check_state, floor_zero, Regime, TransitionError};
use crate::params::SimulationParams;
use crate::stress;
use crate::types::Member;

/// Advance one member's traditional-economy wealth by one week.
///
/// Income is credited first, then the stress-adjusted spending requirement
/// is paid out of whatever wealth is available. Wealth never goes negative.
pub fn advance(member: &Member, _params: &SimulationParams, ctx: &WeekContext) -> Result<Member, TransitionError> {
    let income = member.weekly_income * ctx.income_factor;
    let budget = member.weekly_food_budget * ctx.cost_factor;

    let required = stress::required_spending(
        budget,
        income,
        member.wealth_a,
        ctx.avg_income,
        ctx.stress_level,
        ctx.severe_stress,
    );

    let available = member.wealth_a + income;
    let spent = required.min(available);
    let wealth_a = check_state(Regime::Traditional, "wealth_a", floor_zero(available - spent))?;

    Ok(Member { wealth_a, ..member.clone() })
}

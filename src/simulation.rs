// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Cooperative Economy Simulation Engine - Simulation Core

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::context::WeekContext;
use crate::error::{Regime, SimError, TransitionError};
use crate::events::EventDetector;
use crate::factory;
use crate::metrics::MetricsAggregator;
use crate::narrative;
use crate::params::SimulationParams;
use crate::regime_a;
use crate::regime_b;
use crate::types::{KeyEvent, Member, SimulationResults, WeeklyMetrics};

// ─── Run state ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Population built, no week simulated yet.
    Initialized,
    Stepping,
    Completed,
}

/// Recovered per-member faults, by regime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultCounts {
    pub traditional: u64,
    pub cooperative: u64,
}

impl FaultCounts {
    pub fn total(&self) -> u64 {
        self.traditional + self.cooperative
    }
}

/// One member after one week, plus whichever regimes failed to advance.
struct MemberStep {
    member: Member,
    traditional_fault: bool,
    cooperative_fault: bool,
}

fn log_fault(member: &Member, week: u32, regime: Regime, err: &TransitionError) {
    warn!(member = member.id, week, %regime, error = %err, "member transition failed; keeping prior state");
}

/// Advance both regimes for one member. A failing regime keeps the member's
/// previous state for that regime only.
fn step_member(member: &Member, params: &SimulationParams, ctx: &WeekContext) -> MemberStep {
    let mut next = member.clone();
    let mut traditional_fault = false;
    let mut cooperative_fault = false;

    match regime_a::advance(member, params, ctx) {
        Ok(a) => next.wealth_a = a.wealth_a,
        Err(e) => {
            log_fault(member, ctx.week, Regime::Traditional, &e);
            traditional_fault = true;
        }
    }

    match regime_b::advance(member, params, ctx) {
        Ok(b) => {
            next.cash_balance = b.cash_balance;
            next.token_balance = b.token_balance;
            next.wealth_b = b.wealth_b;
            next.internal_transaction_count = b.internal_transaction_count;
            next.token_usage_rate = b.token_usage_rate;
        }
        Err(e) => {
            log_fault(member, ctx.week, Regime::Cooperative, &e);
            cooperative_fault = true;
        }
    }

    MemberStep { member: next, traditional_fault, cooperative_fault }
}

// ─── CoopSimulation ─────────────────────────────────────────────────────────

/// Week-by-week driver for one run. Build with [`CoopSimulation::new`], call
/// [`step_week`](Self::step_week) until completed, then [`finish`](Self::finish).
pub struct CoopSimulation {
    params: SimulationParams,
    seed: u64,
    members: Vec<Member>,
    week: u32,
    aggregator: MetricsAggregator,
    detector: EventDetector,
    history: Vec<WeeklyMetrics>,
    faults: FaultCounts,
}

impl CoopSimulation {
    /// Validate `params`, resolve the seed and build the population.
    pub fn new(params: SimulationParams) -> Result<Self, SimError> {
        params.validate()?;
        // Drawn seeds stay within 53 bits so they survive a trip through JS numbers.
        let seed = params.seed.unwrap_or_else(|| rand::random::<u64>() >> 11);

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let members = factory::build_population(&params, &mut rng).map_err(|e| {
            error!(error = %e, "population initialization failed");
            e
        })?;

        info!(
            members = members.len(),
            weeks = params.simulation_weeks,
            seed,
            "simulation initialized"
        );

        let history = Vec::with_capacity(params.simulation_weeks as usize);
        Ok(Self {
            params,
            seed,
            members,
            week: 0,
            aggregator: MetricsAggregator::new(),
            detector: EventDetector::new(),
            history,
            faults: FaultCounts::default(),
        })
    }

    pub fn phase(&self) -> RunPhase {
        if self.week == 0 {
            RunPhase::Initialized
        } else if self.week < self.params.simulation_weeks {
            RunPhase::Stepping
        } else {
            RunPhase::Completed
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase() == RunPhase::Completed
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Last completed week (0 before the first step).
    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn history(&self) -> &[WeeklyMetrics] {
        &self.history
    }

    pub fn key_events(&self) -> &[KeyEvent] {
        self.detector.events()
    }

    pub fn faults(&self) -> FaultCounts {
        self.faults
    }

    /// Simulate one week: advance every member under both regimes, then
    /// aggregate and scan for key events.
    pub fn step_week(&mut self) -> Result<&WeeklyMetrics, SimError> {
        if self.is_complete() {
            return Err(SimError::AlreadyCompleted { weeks: self.params.simulation_weeks });
        }
        let week = self.week + 1;
        let ctx = WeekContext::new(&self.params, &self.members, week, self.seed);
        let params = &self.params;

        #[cfg(feature = "parallel")]
        let steps: Vec<MemberStep> = self.members.par_iter().map(|m| step_member(m, params, &ctx)).collect();
        #[cfg(not(feature = "parallel"))]
        let steps: Vec<MemberStep> = self.members.iter().map(|m| step_member(m, params, &ctx)).collect();

        let mut members = Vec::with_capacity(steps.len());
        for step in steps {
            self.faults.traditional += u64::from(step.traditional_fault);
            self.faults.cooperative += u64::from(step.cooperative_fault);
            members.push(step.member);
        }
        self.members = members;
        self.week = week;

        let metrics = self.aggregator.compute(week, &self.members, &self.params);
        let new_events = self.detector.observe(self.history.last(), &metrics, &self.params.calibration);
        debug!(
            week,
            gini_a = metrics.gini_a,
            gini_b = metrics.gini_b,
            poverty_a = metrics.poverty_rate_a,
            poverty_b = metrics.poverty_rate_b,
            stress = ctx.stress_level,
            new_events,
            "week complete"
        );
        self.history.push(metrics);

        self.history
            .last()
            .ok_or_else(|| SimError::Assembly(format!("week {week} missing from history")))
    }

    /// Step until the configured number of weeks has been simulated.
    pub fn run_to_end(&mut self) -> Result<(), SimError> {
        while !self.is_complete() {
            self.step_week()?;
        }
        Ok(())
    }

    /// Assemble the result bundle. Fails if the run is incomplete or the
    /// final population holds an invalid wealth value.
    pub fn finish(self) -> Result<SimulationResults, SimError> {
        let expected = self.params.simulation_weeks as usize;
        if self.history.len() != expected {
            let err = SimError::Assembly(format!(
                "history holds {} of {} weeks",
                self.history.len(),
                expected
            ));
            error!(error = %err, "result assembly failed");
            return Err(err);
        }
        if let Some(bad) = self
            .members
            .iter()
            .find(|m| !(m.wealth_a.is_finite() && m.wealth_b.is_finite() && m.wealth_a >= 0.0 && m.wealth_b >= 0.0))
        {
            let err = SimError::Assembly(format!("member {} has invalid final wealth", bad.label()));
            error!(error = %err, "result assembly failed");
            return Err(err);
        }

        let key_events = self.detector.into_events();
        let summary = narrative::generate(&self.history, &key_events);
        let final_members = self.members.iter().map(Member::snapshot).collect();

        info!(
            weeks = self.history.len(),
            events = key_events.len(),
            faults = self.faults.total(),
            seed = self.seed,
            "simulation completed"
        );

        Ok(SimulationResults {
            history: self.history,
            final_members,
            key_events,
            summary,
            params: self.params,
            seed: self.seed,
        })
    }
}

/// Run a complete simulation.
pub fn run(params: SimulationParams) -> Result<SimulationResults, SimError> {
    let mut sim = CoopSimulation::new(params)?;
    sim.run_to_end()?;
    sim.finish()
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn small(seed: u64) -> SimulationParams {
        SimulationParams { num_members: 12, simulation_weeks: 6, ..SimulationParams::seeded(seed) }
    }

    #[test]
    fn test_phases() {
        let mut sim = CoopSimulation::new(small(1)).unwrap();
        assert_eq!(sim.phase(), RunPhase::Initialized);
        assert_eq!(sim.members().len(), 12);
        sim.step_week().unwrap();
        assert_eq!(sim.phase(), RunPhase::Stepping);
        sim.run_to_end().unwrap();
        assert_eq!(sim.phase(), RunPhase::Completed);
        assert_eq!(sim.history().len(), 6);
        assert!(matches!(sim.step_week(), Err(SimError::AlreadyCompleted { weeks: 6 })));
    }

    #[test]
    fn test_single_week_run() {
        let params = SimulationParams { simulation_weeks: 1, ..small(2) };
        let mut sim = CoopSimulation::new(params).unwrap();
        let m = sim.step_week().unwrap();
        assert_eq!(m.week, 1);
        assert!(sim.is_complete());
    }

    #[test]
    fn test_weeks_are_numbered_from_one() {
        let results = run(small(3)).unwrap();
        let weeks: Vec<u32> = results.history.iter().map(|m| m.week).collect();
        assert_eq!(weeks, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_finish_before_completion_fails() {
        let mut sim = CoopSimulation::new(small(4)).unwrap();
        sim.step_week().unwrap();
        assert!(matches!(sim.finish(), Err(SimError::Assembly(_))));
    }

    #[test]
    fn test_invalid_params_rejected_before_work() {
        let params = SimulationParams { num_members: 0, ..small(5) };
        assert!(matches!(CoopSimulation::new(params), Err(SimError::Config(_))));
    }

    #[test]
    fn test_unseeded_run_reports_seed() {
        let params = SimulationParams { seed: None, ..small(0) };
        let first = run(params.clone()).unwrap();
        let replay = run(SimulationParams { seed: Some(first.seed), ..params }).unwrap();
        assert_eq!(first.final_members, replay.final_members);
    }

    #[test]
    fn test_faulty_member_keeps_prior_state() {
        let params = small(6);
        let mut sim = CoopSimulation::new(params.clone()).unwrap();
        sim.members[0].cash_balance = f64::NAN;
        let before = sim.members[0].clone();
        sim.step_week().unwrap();

        let after = &sim.members()[0];
        // Regime B could not advance, regime A did
        assert!(after.cash_balance.is_nan());
        assert_eq!(after.token_balance, before.token_balance);
        assert_ne!(after.wealth_a, before.wealth_a);
        assert_eq!(sim.faults(), FaultCounts { traditional: 0, cooperative: 1 });
        assert_eq!(sim.history().len(), 1);
    }

    #[test]
    fn test_step_member_isolates_regimes() {
        let params = small(7);
        let sim = CoopSimulation::new(params.clone()).unwrap();
        let ctx = WeekContext::new(&params, sim.members(), 1, sim.seed());
        let mut broken = sim.members()[0].clone();
        broken.wealth_a = f64::INFINITY;
        broken.propensity = 0.5;
        let step = step_member(&broken, &params, &ctx);
        assert!(step.traditional_fault);
        assert!(!step.cooperative_fault);
        assert_eq!(step.member.wealth_a, f64::INFINITY);
        assert_ne!(step.member.cash_balance, broken.cash_balance);
        assert_eq!(step.member.internal_transaction_count, 1);
    }
}

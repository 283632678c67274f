// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Cooperative Economy Simulation Engine - Key Event Detection

use crate::params::Calibration;
use crate::types::{EventKind, KeyEvent, WeeklyMetrics};

/// Compares consecutive weekly records and appends key events.
#[derive(Debug, Default)]
pub struct EventDetector {
    events: Vec<KeyEvent>,
}

impl EventDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[KeyEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<KeyEvent> {
        self.events
    }

    /// Inspect `current` against `previous` (None on week 1) and record any
    /// qualifying shift. Returns the number of events added.
    pub fn observe(
        &mut self,
        previous: Option<&WeeklyMetrics>,
        current: &WeeklyMetrics,
        calibration: &Calibration,
    ) -> usize {
        let Some(prev) = previous else {
            return 0;
        };
        let before = self.events.len();
        let eps = calibration.epsilon;

        let gini_threshold = prev.gini_b * calibration.equality_event_ratio;
        if prev.gini_b > eps && current.gini_b <= gini_threshold {
            self.events.push(KeyEvent {
                week: current.week,
                kind: EventKind::EqualityImprovement,
                description: format!(
                    "Significant reduction in wealth inequality (Gini B {:.3} <= {:.3})",
                    current.gini_b, gini_threshold
                ),
            });
        }

        let poverty_threshold = prev.poverty_rate_b * calibration.poverty_event_ratio;
        if prev.poverty_rate_b > eps && current.poverty_rate_b <= poverty_threshold {
            self.events.push(KeyEvent {
                week: current.week,
                kind: EventKind::PovertyReduction,
                description: format!(
                    "Significant poverty reduction (Rate B {:.1}% <= {:.1}%)",
                    current.poverty_rate_b * 100.0,
                    poverty_threshold * 100.0
                ),
            });
        }

        self.events.len() - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsAggregator;
    use crate::params::SimulationParams;
    use crate::types::Member;

    fn record(week: u32, gini_b: f64, poverty_rate_b: f64) -> WeeklyMetrics {
        let member = Member {
            id: 0,
            initial_wealth: 1.0,
            wealth_a: 1.0,
            cash_balance: 1.0,
            token_balance: 0.0,
            wealth_b: 1.0,
            weekly_food_budget: 75.0,
            weekly_income: 150.0,
            propensity: 0.5,
            internal_transaction_count: 0,
            token_usage_rate: 0.0,
        };
        let mut m = MetricsAggregator::new().compute(week, &[member], &SimulationParams::default());
        m.gini_b = gini_b;
        m.poverty_rate_b = poverty_rate_b;
        m
    }

    #[test]
    fn test_first_week_is_skipped() {
        let mut d = EventDetector::new();
        assert_eq!(d.observe(None, &record(1, 0.0, 0.0), &Calibration::default()), 0);
        assert!(d.events().is_empty());
    }

    #[test]
    fn test_equality_improvement() {
        let cal = Calibration::default();
        let mut d = EventDetector::new();
        assert_eq!(d.observe(Some(&record(1, 0.40, 0.5)), &record(2, 0.39, 0.5), &cal), 0);
        assert_eq!(d.observe(Some(&record(2, 0.40, 0.5)), &record(3, 0.37, 0.5), &cal), 1);
        let ev = &d.events()[0];
        assert_eq!(ev.week, 3);
        assert_eq!(ev.kind, EventKind::EqualityImprovement);
        assert!(ev.description.contains("0.380"));
    }

    #[test]
    fn test_poverty_reduction_threshold_is_inclusive() {
        let cal = Calibration::default();
        let mut d = EventDetector::new();
        // 0.45 is exactly 90% of 0.5
        assert_eq!(d.observe(Some(&record(4, 0.3, 0.5)), &record(5, 0.3, 0.45), &cal), 1);
        assert_eq!(d.events()[0].kind, EventKind::PovertyReduction);
    }

    #[test]
    fn test_both_events_in_one_week() {
        let mut d = EventDetector::new();
        let added = d.observe(Some(&record(7, 0.5, 0.4)), &record(8, 0.2, 0.1), &Calibration::default());
        assert_eq!(added, 2);
        let kinds: Vec<EventKind> = d.into_events().into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::EqualityImprovement, EventKind::PovertyReduction]);
    }

    #[test]
    fn test_zero_previous_values_never_fire() {
        let mut d = EventDetector::new();
        assert_eq!(d.observe(Some(&record(1, 0.0, 0.0)), &record(2, 0.0, 0.0), &Calibration::default()), 0);
    }
}

// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Cooperative Economy Simulation Engine - Narrative Summary
//
// Plain-language summary of a finished run, derived only from the weekly
// history and the detected key events.

use serde::{Deserialize, Serialize};

use crate::types::{KeyEvent, WeeklyMetrics};

/// Phase analysis needs at least three weeks per phase.
const MIN_WEEKS_FOR_PHASES: usize = 9;
const GROWTH_EPSILON: f64 = 1e-6;

// ─── Types ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub title: String,
    pub overview: String,
    pub key_findings: Option<KeyFindings>,
    pub phase_analysis: Vec<PhaseAnalysis>,
    pub key_events: Vec<String>,
    pub conclusion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFindings {
    pub wealth_impact: WealthImpact,
    pub equality_measures: EqualityMeasures,
    pub community_health: CommunityHealth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WealthImpact {
    pub summary: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqualityMeasures {
    pub summary: String,
    pub gini: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityHealth {
    pub poverty: String,
    pub resilience: String,
    pub details: String,
    pub sustainability: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Initial,
    Development,
    Maturity,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Initial => "Initial Phase",
            Self::Development => "Development Phase",
            Self::Maturity => "Maturity Phase",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseMetrics {
    pub avg_wealth: String,
    pub poverty_rate: String,
    pub gini: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseAnalysis {
    pub period: String,
    pub phase: Phase,
    pub characteristics: String,
    pub metrics: PhaseMetrics,
}

// ─── Formatting helpers ─────────────────────────────────────────────────────

fn ratio_or_na(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.1}x")
    } else {
        "N/A".to_string()
    }
}

/// `1234567.891` -> `1,234,567.89`
fn with_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

fn relative_growth(start: f64, end: f64) -> f64 {
    if start > GROWTH_EPSILON {
        (end - start) / start
    } else {
        0.0
    }
}

// ─── Generation ─────────────────────────────────────────────────────────────

pub fn generate(history: &[WeeklyMetrics], events: &[KeyEvent]) -> Narrative {
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        return Narrative {
            title: "Error".into(),
            overview: "No simulation history data available.".into(),
            conclusion: "No simulation data to generate conclusion.".into(),
            ..Default::default()
        };
    };

    let key_events = if events.is_empty() {
        vec!["No significant key events detected.".to_string()]
    } else {
        events.iter().map(|e| format!("Week {}: {}", e.week, e.description)).collect()
    };

    Narrative {
        title: "Economic System Evolution Analysis".into(),
        overview: format!(
            "Over {} weeks, the community's economic system under Scenario B (Cooperative) \
             showed notable changes compared to Scenario A (Existing).",
            history.len()
        ),
        key_findings: Some(key_findings(first, last)),
        phase_analysis: analyze_phases(history),
        key_events,
        conclusion: conclusion(history),
    }
}

fn key_findings(first: &WeeklyMetrics, last: &WeeklyMetrics) -> KeyFindings {
    let wealth_change = relative_growth(first.total_wealth_b, last.total_wealth_b);
    let gini_change = last.gini_b - first.gini_b;
    let poverty_trend = if last.poverty_rate_b < first.poverty_rate_b {
        "decreased"
    } else {
        "increased or stayed same"
    };

    KeyFindings {
        wealth_impact: WealthImpact {
            summary: format!(
                "Total wealth in Scenario B {} by {:.1}% compared to its start.",
                if wealth_change > 0.0 { "grew" } else { "declined" },
                wealth_change.abs() * 100.0
            ),
            details: format!(
                "Average wealth in B finished at ${:.2}, compared to ${:.2} in A. \
                 The wealth distribution in B became {} unequal over time.",
                last.avg_wealth_b,
                last.avg_wealth_a,
                if gini_change > 0.0 { "more" } else { "less" }
            ),
        },
        equality_measures: EqualityMeasures {
            summary: format!(
                "Wealth inequality in B {} by {:.1}% (absolute Gini change).",
                if gini_change < 0.0 { "decreased" } else { "increased" },
                gini_change.abs() * 100.0
            ),
            gini: format!(
                "Gini coefficient in B moved from {:.3} to {:.3} (vs {:.3} in A).",
                first.gini_b, last.gini_b, last.gini_a
            ),
            details: format!(
                "The poorest 20% share of total wealth in B changed from {:.1}% to {:.1}%. \
                 The wealth gap (Top 20% / Bottom 20%) finished at {} in B (vs {} in A).",
                first.bottom20_pct_share * 100.0,
                last.bottom20_pct_share * 100.0,
                ratio_or_na(last.wealth_gap_b),
                ratio_or_na(last.wealth_gap_a)
            ),
        },
        community_health: CommunityHealth {
            poverty: format!(
                "Poverty rate in B {}, finishing at {:.1}% (vs {:.1}% in A).",
                poverty_trend,
                last.poverty_rate_b * 100.0,
                last.poverty_rate_a * 100.0
            ),
            resilience: format!("Community resilience index in B finished at: {:.2}", last.community_resilience),
            details: format!(
                "Economic health indicators suggest Scenario B fostered {} in resilience.",
                if last.community_resilience > first.community_resilience { "improvement" } else { "challenges" }
            ),
            sustainability: format!("Economic sustainability score in B: {:.2}", last.sustainability_score),
        },
    }
}

/// Split the history into thirds and characterise wealth growth in each.
pub fn analyze_phases(history: &[WeeklyMetrics]) -> Vec<PhaseAnalysis> {
    let n = history.len();
    if n < MIN_WEEKS_FOR_PHASES {
        return Vec::new();
    }
    let len = n / 3;
    let spans = [
        (Phase::Initial, &history[..len], format!("Weeks 1-{len}")),
        (Phase::Development, &history[len..2 * len], format!("Weeks {}-{}", len + 1, 2 * len)),
        (Phase::Maturity, &history[2 * len..], format!("Weeks {}-{n}", 2 * len + 1)),
    ];

    let mut previous_growth = 0.0;
    let mut phases = Vec::with_capacity(3);
    for (phase, data, period) in spans {
        let (Some(start), Some(end)) = (data.first(), data.last()) else {
            continue;
        };
        let growth = relative_growth(start.total_wealth_b, end.total_wealth_b);
        let character = match phase {
            Phase::Initial if growth.abs() < 0.05 => "Adaptation",
            Phase::Initial if growth > 0.1 => "Rapid Growth",
            Phase::Initial => "Steady Growth",
            Phase::Development if growth < previous_growth => "Consolidation",
            Phase::Development if growth > previous_growth => "Acceleration",
            Phase::Development => "Stabilization",
            Phase::Maturity if growth.abs() < 0.03 => "Maturity",
            Phase::Maturity if growth > 0.0 => "Continued Growth",
            Phase::Maturity => "Contraction",
        };
        previous_growth = growth;

        phases.push(PhaseAnalysis {
            period,
            phase,
            characteristics: format!("{character} (Wealth Change: {:+.1}%)", growth * 100.0),
            metrics: PhaseMetrics {
                avg_wealth: format!("${:.2}", end.avg_wealth_b),
                poverty_rate: format!("{:.1}%", end.poverty_rate_b * 100.0),
                gini: format!("{:.3}", end.gini_b),
            },
        });
    }
    phases
}

/// Closing paragraph comparing the cooperative regime to its own start and
/// to the traditional regime at the end of the run.
pub fn conclusion(history: &[WeeklyMetrics]) -> String {
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        return "No simulation data to generate conclusion.".into();
    };

    let wealth_change = relative_growth(first.total_wealth_b, last.total_wealth_b);
    let gini_change = last.gini_b - first.gini_b;
    let poverty_change = last.poverty_rate_b - first.poverty_rate_b;
    let resilience_change = last.community_resilience - first.community_resilience;
    let wealth_diff = last.total_wealth_b - last.total_wealth_a;
    let gini_diff = last.gini_b - last.gini_a;

    let success = if wealth_change > 0.1 && poverty_change < 0.0 {
        "successful"
    } else if wealth_change >= 0.0 && poverty_change <= 0.0 {
        "moderately successful"
    } else {
        "challenging"
    };
    let equity = if gini_change < -0.02 {
        "more equitable"
    } else if gini_change < 0.0 {
        "slightly more equitable"
    } else if gini_change > 0.02 {
        "less equitable"
    } else {
        "equity neutral"
    };
    let resilience = if resilience_change > 0.05 {
        "more resilient"
    } else if resilience_change < -0.05 {
        "less resilient"
    } else {
        "resilience neutral"
    };

    let mut text = format!(
        "The simulation suggests a {success} outcome for the Cooperative Model (Scenario B) over {} weeks. \
         Compared to its starting point, the community became {equity} and potentially {resilience}. ",
        history.len()
    );
    if wealth_diff > 0.0 {
        text.push_str(&format!(
            "Scenario B ended with ${} more total wealth than Scenario A (Existing System). ",
            with_thousands(wealth_diff)
        ));
    } else {
        text.push_str(&format!(
            "However, Scenario B ended with ${} less total wealth than Scenario A. ",
            with_thousands(wealth_diff.abs())
        ));
    }
    if gini_diff < -0.01 {
        text.push_str(&format!("Scenario B also demonstrated lower final inequality (Gini diff: {gini_diff:.3}). "));
    } else if gini_diff > 0.01 {
        text.push_str(&format!("However, Scenario B showed higher final inequality (Gini diff: {gini_diff:.3}). "));
    } else {
        text.push_str("Final inequality levels were similar between scenarios. ");
    }
    text.push_str(
        "These results highlight the potential benefits (or drawbacks) of the cooperative model under the \
         simulated parameters, particularly regarding wealth retention and distribution.",
    );
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsAggregator;
    use crate::params::SimulationParams;
    use crate::types::{EventKind, Member};

    fn member(id: u32, wealth_a: f64, wealth_b: f64) -> Member {
        Member {
            id,
            initial_wealth: wealth_a,
            wealth_a,
            cash_balance: wealth_b,
            token_balance: 0.0,
            wealth_b,
            weekly_food_budget: 75.0,
            weekly_income: 150.0,
            propensity: 0.6,
            internal_transaction_count: 0,
            token_usage_rate: 0.05,
        }
    }

    /// `weeks` records where regime-B wealth grows `growth` per week.
    fn history(weeks: u32, growth: f64) -> Vec<WeeklyMetrics> {
        let params = SimulationParams::default();
        let mut agg = MetricsAggregator::new();
        (1..=weeks)
            .map(|w| {
                let scale = 1.0 + growth * f64::from(w);
                let members: Vec<Member> = (0..10)
                    .map(|i| member(i, 100.0 * f64::from(i + 1), 100.0 * f64::from(i + 1) * scale))
                    .collect();
                agg.compute(w, &members, &params)
            })
            .collect()
    }

    #[test]
    fn test_empty_history() {
        let n = generate(&[], &[]);
        assert_eq!(n.title, "Error");
        assert!(n.key_findings.is_none());
        assert!(n.phase_analysis.is_empty());
    }

    #[test]
    fn test_growing_history() {
        let h = history(12, 0.05);
        let n = generate(&h, &[]);
        assert_eq!(n.title, "Economic System Evolution Analysis");
        assert!(n.overview.contains("Over 12 weeks"));
        assert_eq!(n.key_events, vec!["No significant key events detected.".to_string()]);

        let findings = n.key_findings.unwrap();
        assert!(findings.wealth_impact.summary.contains("grew"));
        assert!(findings.equality_measures.details.contains("6.3x"));
        assert!(n.conclusion.contains("more total wealth than Scenario A"));
        assert!(n.conclusion.contains("over 12 weeks"));
    }

    #[test]
    fn test_phase_analysis_needs_nine_weeks() {
        assert!(analyze_phases(&history(8, 0.01)).is_empty());
        let phases = analyze_phases(&history(10, 0.01));
        assert_eq!(phases.len(), 3);
        assert_eq!(phases[0].period, "Weeks 1-3");
        assert_eq!(phases[1].period, "Weeks 4-6");
        assert_eq!(phases[2].period, "Weeks 7-10");
        assert_eq!(phases[2].phase.label(), "Maturity Phase");
        assert!(phases[0].characteristics.starts_with("Adaptation"));
    }

    #[test]
    fn test_phase_characteristics_under_growth() {
        let phases = analyze_phases(&history(9, 0.2));
        // weeks 1..3: 1.2 -> 1.6, +33%
        assert!(phases[0].characteristics.starts_with("Rapid Growth"));
        // weeks 4..6: 1.8 -> 2.2, +22%, slower than before
        assert!(phases[1].characteristics.starts_with("Consolidation"));
        assert!(phases[2].characteristics.starts_with("Continued Growth"));
    }

    #[test]
    fn test_events_are_listed() {
        let events = vec![KeyEvent {
            week: 4,
            kind: EventKind::PovertyReduction,
            description: "Significant poverty reduction".into(),
        }];
        let n = generate(&history(3, 0.0), &events);
        assert_eq!(n.key_events, vec!["Week 4: Significant poverty reduction".to_string()]);
    }

    #[test]
    fn test_declining_conclusion() {
        let h = history(10, -0.05);
        let text = conclusion(&h);
        assert!(text.contains("challenging"));
        assert!(text.contains("less total wealth"));
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(with_thousands(1234567.891), "1,234,567.89");
        assert_eq!(with_thousands(999.5), "999.50");
        assert_eq!(with_thousands(-1000.0), "-1,000.00");
        assert_eq!(ratio_or_na(f64::INFINITY), "N/A");
    }
}

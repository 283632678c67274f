// Per-Week JSONL Time Series Recorder
// Outputs one JSON line per simulated week for independent analysis

use coop_engine::WeeklyMetrics;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct WeekSnapshot {
    pub week: u32,
    pub year: u32,
    pub quarter: u32,
    pub total_wealth_a: f64,
    pub total_wealth_b: f64,
    pub median_wealth_a: f64,
    pub median_wealth_b: f64,
    pub gini_a: f64,
    pub gini_b: f64,
    /// `None` when the gap is undefined (small population or zero bottom).
    pub wealth_gap_a: Option<f64>,
    pub wealth_gap_b: Option<f64>,
    pub poverty_rate_a: f64,
    pub poverty_rate_b: f64,
    pub community_resilience: f64,
    pub market_efficiency: f64,
    pub innovation_adoption: f64,
    pub risk_resilience: f64,
    pub avg_wealth_b_trend: f64,
    pub gini_b_trend: f64,
    pub events_so_far: usize,
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

impl WeekSnapshot {
    pub fn from_metrics(m: &WeeklyMetrics, events_so_far: usize) -> Self {
        Self {
            week: m.week,
            year: m.year,
            quarter: m.quarter,
            total_wealth_a: m.total_wealth_a,
            total_wealth_b: m.total_wealth_b,
            median_wealth_a: m.median_wealth_a,
            median_wealth_b: m.median_wealth_b,
            gini_a: m.gini_a,
            gini_b: m.gini_b,
            wealth_gap_a: finite(m.wealth_gap_a),
            wealth_gap_b: finite(m.wealth_gap_b),
            poverty_rate_a: m.poverty_rate_a,
            poverty_rate_b: m.poverty_rate_b,
            community_resilience: m.community_resilience,
            market_efficiency: m.market_efficiency,
            innovation_adoption: m.innovation_adoption,
            risk_resilience: m.risk_resilience,
            avg_wealth_b_trend: m.trends.avg_wealth_b,
            gini_b_trend: m.trends.gini_b,
            events_so_far,
        }
    }
}

/// Time series recorder that accumulates snapshots and writes JSONL
pub struct TimeSeriesRecorder {
    snapshots: Vec<WeekSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, metrics: &WeeklyMetrics, events_so_far: usize) {
        self.snapshots.push(WeekSnapshot::from_metrics(metrics, events_so_far));
    }

    /// Write all snapshots to a JSONL file
    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }
}

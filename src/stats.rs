// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Cooperative Economy Simulation Engine - Distribution Statistics
//
// Slice-level statistics shared by the aggregator and the week context.
// Percentiles use linear interpolation between closest ranks.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Ascending copy with negatives clamped to zero.
pub fn sorted_non_negative(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().map(|v| v.max(0.0)).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Percentile `p` in [0, 100] of an ascending slice.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

pub fn percentile(values: &[f64], p: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, p)
}

/// Rank-weighted Gini coefficient. Negative wealth counts as zero.
/// Returns 0.0 for empty or all-zero input.
pub fn gini(values: &[f64]) -> f64 {
    let sorted = sorted_non_negative(values);
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = sorted.iter().sum();
    let denominator = n as f64 * total;
    if denominator == 0.0 {
        return 0.0;
    }
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, w)| (2.0 * (i + 1) as f64 - n as f64 - 1.0) * w)
        .sum();
    (weighted / denominator).clamp(0.0, 1.0)
}

/// Mean of the top 20% divided by mean of the bottom 20%.
///
/// Returns `f64::INFINITY` when the population is smaller than `min_population`
/// or the bottom mean is effectively zero.
pub fn wealth_gap(values: &[f64], min_population: usize, epsilon: f64) -> f64 {
    let n = values.len();
    if n < min_population.max(1) {
        return f64::INFINITY;
    }
    let sorted = sorted_non_negative(values);
    let top_idx = (n as f64 * 0.8) as usize;
    let bottom_idx = (n as f64 * 0.2) as usize;
    if bottom_idx == 0 || top_idx >= n {
        return f64::INFINITY;
    }
    let top_mean = mean(&sorted[top_idx..]);
    let bottom_mean = mean(&sorted[..bottom_idx]);
    if bottom_mean <= epsilon {
        return f64::INFINITY;
    }
    top_mean / bottom_mean
}

/// Share of total wealth held by the poorest 20%.
pub fn bottom_share(values: &[f64], min_population: usize, epsilon: f64) -> f64 {
    let n = values.len();
    if n < min_population.max(1) {
        return 0.0;
    }
    let sorted = sorted_non_negative(values);
    let total: f64 = sorted.iter().sum();
    if total <= epsilon {
        return 0.0;
    }
    let bottom_idx = (n as f64 * 0.2) as usize;
    sorted[..bottom_idx].iter().sum::<f64>() / total
}

/// Fraction of values strictly below `line`.
pub fn share_below(values: &[f64], line: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|&&v| v < line).count() as f64 / values.len() as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

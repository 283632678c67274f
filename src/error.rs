// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Cooperative Economy Simulation Engine - Error Types

use crate::params::ConfigError;

/// Which economy a transition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Traditional,
    Cooperative,
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Traditional => write!(f, "A"),
            Self::Cooperative => write!(f, "B"),
        }
    }
}

/// Per-member, per-week fault. Recovered by keeping the member's prior state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error("regime {regime}: {field} is not finite ({value})")]
    NonFinite { regime: Regime, field: &'static str, value: f64 },
    #[error("regime {regime}: {field} went negative ({value})")]
    Negative { regime: Regime, field: &'static str, value: f64 },
    #[error("regime {regime}: invalid distribution: {reason}")]
    Distribution { regime: Regime, reason: String },
}

/// Top-level engine error. No partial result is produced when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("initialization failed: {0}")]
    Initialization(String),
    #[error("simulation already completed after {weeks} weeks")]
    AlreadyCompleted { weeks: u32 },
    #[error("result assembly failed: {0}")]
    Assembly(String),
}

/// Clamp tiny negative rounding residue to zero. NaN passes through so that
/// `check_state` can reject it.
pub(crate) fn floor_zero(value: f64) -> f64 {
    if value < 0.0 {
        0.0
    } else {
        value
    }
}

/// Reject a non-finite or negative state value produced by a transition.
pub(crate) fn check_state(regime: Regime, field: &'static str, value: f64) -> Result<f64, TransitionError> {
    if !value.is_finite() {
        return Err(TransitionError::NonFinite { regime, field, value });
    }
    if value < 0.0 {
        return Err(TransitionError::Negative { regime, field, value });
    }
    Ok(value)
}

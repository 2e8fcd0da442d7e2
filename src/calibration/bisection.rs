//! Bisection search for the parameter value that drives a metric to a target
//!
//! The metric is assumed monotonic over the search range in the declared direction.
//! This is not checked; a non-monotonic metric gives an approximate or meaningless result.

use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;

/// How the metric moves as the parameter grows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Increases,
    Decreases,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSettings {
    pub lo: f64,
    pub hi: f64,
    pub target: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub direction: Direction,
}

impl SearchSettings {
    fn validate(&self) -> Result<(), CalibrationError> {
        if !self.lo.is_finite() || !self.hi.is_finite() || self.lo >= self.hi {
            return Err(CalibrationError::InvalidRange { lo: self.lo, hi: self.hi });
        }
        if self.max_iterations == 0 {
            return Err(CalibrationError::NoIterations);
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(CalibrationError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

/// Result of a search: a value, or the sentinel for "cannot reach the target in range"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum SearchOutcome {
    Found(f64),
    Unreachable,
}

impl SearchOutcome {
    pub fn value(&self) -> Option<f64> {
        match self {
            SearchOutcome::Found(v) => Some(*v),
            SearchOutcome::Unreachable => None,
        }
    }

    pub fn map(self, f: impl FnOnce(f64) -> f64) -> SearchOutcome {
        match self {
            SearchOutcome::Found(v) => SearchOutcome::Found(f(v)),
            SearchOutcome::Unreachable => SearchOutcome::Unreachable,
        }
    }
}

/// Round to the nearest multiple of `granularity`
pub fn round_to(value: f64, granularity: f64) -> f64 {
    if granularity <= 0.0 {
        return value;
    }
    (value / granularity).round() * granularity
}

/// Bisect `[lo, hi]` until `|metric(mid) - target| < tolerance` or iterations run out.
///
/// Returns the last midpoint when iterations run out, unless its metric is still
/// below `target - tolerance`, in which case the target is unreachable in range.
pub fn find_target<F>(mut metric: F, settings: &SearchSettings) -> Result<SearchOutcome, CalibrationError>
where
    F: FnMut(f64) -> f64,
{
    settings.validate()?;

    let mut lo = settings.lo;
    let mut hi = settings.hi;
    let mut mid = (lo + hi) / 2.0;
    let mut value = f64::NAN;

    for iteration in 1..=settings.max_iterations {
        mid = (lo + hi) / 2.0;
        value = metric(mid);
        if !value.is_finite() {
            return Err(CalibrationError::NonFiniteMetric { at: mid });
        }

        log::debug!("bisection {iteration}: [{lo:.4}, {hi:.4}] mid={mid:.4} metric={value:.0}");

        if (value - settings.target).abs() < settings.tolerance {
            return Ok(SearchOutcome::Found(mid));
        }

        let below = value < settings.target;
        match (settings.direction, below) {
            (Direction::Increases, true) | (Direction::Decreases, false) => lo = mid,
            (Direction::Increases, false) | (Direction::Decreases, true) => hi = mid,
        }
    }

    if value < settings.target - settings.tolerance {
        Ok(SearchOutcome::Unreachable)
    } else {
        Ok(SearchOutcome::Found(mid))
    }
}

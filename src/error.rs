//! Error types for input loading and calibration

use thiserror::Error;

/// Failures while reading or checking configuration inputs
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("malformed settings in {path}: {source}")]
    Settings {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("distribution percentages sum to {total}%, above 100%")]
    DistributionOverflow { total: f64 },

    #[error("distribution entry for deviation {deviation} has negative percentage {percentage}")]
    NegativePercentage { deviation: i32, percentage: f64 },
}

/// Internal failures of a calibration search.
///
/// "Cannot balance within range" is not an error; see
/// [`SearchOutcome::Unreachable`](crate::calibration::SearchOutcome::Unreachable).
#[derive(Debug, Error, PartialEq)]
pub enum CalibrationError {
    #[error("search range [{lo}, {hi}] is empty or not finite")]
    InvalidRange { lo: f64, hi: f64 },

    #[error("search needs at least one iteration")]
    NoIterations,

    #[error("tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),

    #[error("metric returned a non-finite value at {at}")]
    NonFiniteMetric { at: f64 },
}

/// Umbrella error for callers that drive the whole pipeline
#[derive(Debug, Error)]
pub enum FundError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}

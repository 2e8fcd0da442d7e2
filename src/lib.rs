//! Loan Fund - Cash-flow projection engine for mutual community loan funds
//!
//! This library provides:
//! - Input tables for existing loan cohorts, yearly new-family parameters and
//!   marriage-age distributions, loadable from CSV/JSON
//! - Year-by-year projections for existing members, new-family cohorts and the combined fund
//! - Bisection calibration of fees, loan terms and take-rate against the minimum balance
//! - Multi-scenario runner

pub mod error;
pub mod inputs;
pub mod projection;
pub mod calibration;
pub mod scenario;

// Re-export commonly used types
pub use error::{CalibrationError, FundError, InputError};
pub use inputs::{FundConfig, FundSettings, MarriageAgeDistribution, YearlyParameterTable};
pub use projection::{ProjectionEngine, ProjectionSet, CombinedYearRow, ProjectionSummary};
pub use calibration::{Calibrator, Parameter, Scope, SearchOutcome};
pub use scenario::ScenarioRunner;

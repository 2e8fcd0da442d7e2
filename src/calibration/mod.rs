//! Parameter calibration: bisection searches for values that keep the fund solvent

mod bisection;
mod calibrator;
mod parameters;

pub use bisection::{find_target, round_to, Direction, SearchOutcome, SearchSettings};
pub use calibrator::{Calibrator, CurrentBalanceState, TargetReport};
pub use parameters::{Parameter, Scope, DEFAULT_TOLERANCE, INITIAL_BALANCE_STEP};

use crate::error::CalibrationError;
use crate::inputs::FundConfig;

/// Minimum balance over the horizon in `scope`, the metric every search drives to zero
pub fn min_balance(config: &FundConfig, scope: Scope) -> f64 {
    crate::scenario::ScenarioRunner::with_config(config.clone()).min_balance(scope)
}

/// Minimum balances and solvency flags of `config`, without any search
pub fn current_balance_state(config: &FundConfig) -> CurrentBalanceState {
    Calibrator::new(config.clone()).current_state()
}

/// Batch calibration of every parameter with the default tolerance
pub fn compute_all_targets(config: &FundConfig) -> Result<Vec<TargetReport>, CalibrationError> {
    Calibrator::new(config.clone()).compute_all_targets()
}

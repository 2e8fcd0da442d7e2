//! Balancing searches over the full projection pipeline

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::bisection::{find_target, round_to, SearchOutcome};
use super::parameters::{Parameter, Scope, DEFAULT_TOLERANCE, INITIAL_BALANCE_STEP};
use crate::error::CalibrationError;
use crate::inputs::FundConfig;
use crate::scenario::ScenarioRunner;

/// Minimum balances of the current configuration, without any search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentBalanceState {
    pub min_new: f64,
    pub min_existing: f64,
    pub min_combined: f64,
    pub new_balanced: bool,
    pub combined_balanced: bool,
}

impl CurrentBalanceState {
    pub fn min_for(&self, scope: Scope) -> f64 {
        match scope {
            Scope::NewOnly => self.min_new,
            Scope::Combined => self.min_combined,
        }
    }
}

/// Batch calibration result for one parameter in one scope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetReport {
    pub parameter: Parameter,
    pub scope: Scope,
    pub current_value: Option<f64>,
    /// Balancing value rounded to the parameter's granularity
    pub target: SearchOutcome,
    pub current_min_balance: f64,
    pub is_balanced: bool,
}

/// Finds parameter values that bring the minimum balance to about zero.
///
/// Each metric evaluation re-runs the whole projection with one parameter replaced.
#[derive(Debug, Clone)]
pub struct Calibrator {
    runner: ScenarioRunner,
    tolerance: f64,
}

impl Calibrator {
    pub fn new(config: FundConfig) -> Self {
        Self {
            runner: ScenarioRunner::with_config(config),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn config(&self) -> &FundConfig {
        self.runner.config()
    }

    /// Minimum balance in `scope` with `parameter` set to `value`
    pub fn metric(&self, parameter: Parameter, scope: Scope, value: f64) -> f64 {
        self.runner.min_balance_with(parameter, value, scope)
    }

    /// Unrounded bisection result for a searchable parameter.
    ///
    /// The initial balance is not searched; it resolves through
    /// [`Calibrator::find_required_initial_balance`].
    pub fn search(&self, parameter: Parameter, scope: Scope) -> Result<SearchOutcome, CalibrationError> {
        let Some(settings) = parameter.search_settings(self.tolerance) else {
            return Ok(SearchOutcome::Found(self.find_required_initial_balance()));
        };
        let outcome = find_target(|value| self.metric(parameter, scope, value), &settings)?;
        log::info!("{parameter} ({scope:?}): {outcome:?}");
        Ok(outcome)
    }

    /// Balancing value rounded to the parameter's granularity
    pub fn find_balancing(&self, parameter: Parameter, scope: Scope) -> Result<SearchOutcome, CalibrationError> {
        let granularity = parameter.granularity();
        Ok(self.search(parameter, scope)?.map(|v| round_to(v, granularity)))
    }

    /// Monthly family fee (rounded to 10)
    pub fn find_balancing_fee(&self, scope: Scope) -> Result<SearchOutcome, CalibrationError> {
        self.find_balancing(Parameter::FamilyFee, scope)
    }

    /// Loan amount for new and existing members (rounded to 5,000)
    pub fn find_balancing_loan_amount(&self, scope: Scope) -> Result<SearchOutcome, CalibrationError> {
        self.find_balancing(Parameter::LoanAmount, scope)
    }

    /// Repayment term in months (rounded to whole years)
    pub fn find_balancing_repayment_months(&self, scope: Scope) -> Result<SearchOutcome, CalibrationError> {
        self.find_balancing(Parameter::RepaymentMonths, scope)
    }

    /// Loan take-rate percentage (rounded to 1)
    pub fn find_balancing_take_rate(&self, scope: Scope) -> Result<SearchOutcome, CalibrationError> {
        self.find_balancing(Parameter::LoanTakeRate, scope)
    }

    /// Starting balance that keeps the combined balance non-negative, with a
    /// one-million margin: `ceil(|min| / 1e6) * 1e6 + 1e6`, or 0 if there is no deficit.
    ///
    /// The minimum is taken with the initial balance set to zero.
    pub fn find_required_initial_balance(&self) -> f64 {
        let min_combined = self.metric(Parameter::InitialBalance, Scope::Combined, 0.0);
        required_initial_balance(min_combined)
    }

    /// Minimum balances of the current configuration
    pub fn current_state(&self) -> CurrentBalanceState {
        let set = self.runner.run();
        let min_new = set.min_new_balance();
        let min_combined = set.min_combined_balance();
        CurrentBalanceState {
            min_new,
            min_existing: set.min_existing_balance(),
            min_combined,
            new_balanced: min_new >= 0.0,
            combined_balanced: min_combined >= 0.0,
        }
    }

    /// Calibrate every parameter in every scope it applies to.
    ///
    /// Pairs are independent full re-simulations and run in parallel.
    pub fn compute_all_targets(&self) -> Result<Vec<TargetReport>, CalibrationError> {
        let state = self.current_state();
        let pairs: Vec<(Parameter, Scope)> = Parameter::ALL
            .iter()
            .flat_map(|&p| Scope::ALL.iter().map(move |&s| (p, s)))
            .filter(|&(p, s)| p != Parameter::InitialBalance || s == Scope::Combined)
            .collect();

        pairs
            .par_iter()
            .map(|&(parameter, scope)| {
                let current_min_balance = state.min_for(scope);
                Ok(TargetReport {
                    parameter,
                    scope,
                    current_value: parameter.current_value(self.config()),
                    target: self.find_balancing(parameter, scope)?,
                    current_min_balance,
                    is_balanced: current_min_balance >= 0.0,
                })
            })
            .collect()
    }
}

fn required_initial_balance(min_combined: f64) -> f64 {
    if min_combined >= 0.0 {
        return 0.0;
    }
    (min_combined.abs() / INITIAL_BALANCE_STEP).ceil() * INITIAL_BALANCE_STEP + INITIAL_BALANCE_STEP
}

//! Tunable parameters, their default search ranges and how they substitute into a config

use serde::{Deserialize, Serialize};

use super::bisection::{Direction, SearchSettings};
use crate::inputs::FundConfig;

/// Default tolerance on the minimum balance, in currency units
pub const DEFAULT_TOLERANCE: f64 = 50_000.0;

/// Granularity of the required initial balance
pub const INITIAL_BALANCE_STEP: f64 = 1_000_000.0;

/// Which series the minimum balance is taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// New-family cohorts alone, starting from zero
    NewOnly,
    /// Existing plus new families, starting from the initial balance
    Combined,
}

impl Scope {
    pub const ALL: [Scope; 2] = [Scope::NewOnly, Scope::Combined];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    FamilyFee,
    LoanAmount,
    RepaymentMonths,
    LoanTakeRate,
    InitialBalance,
}

impl Parameter {
    pub const ALL: [Parameter; 5] = [
        Parameter::FamilyFee,
        Parameter::LoanAmount,
        Parameter::RepaymentMonths,
        Parameter::LoanTakeRate,
        Parameter::InitialBalance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Parameter::FamilyFee => "family fee",
            Parameter::LoanAmount => "loan amount",
            Parameter::RepaymentMonths => "repayment months",
            Parameter::LoanTakeRate => "loan take-rate %",
            Parameter::InitialBalance => "initial balance",
        }
    }

    /// Search range; the initial balance is computed, not searched
    pub fn default_range(&self) -> Option<(f64, f64)> {
        match self {
            Parameter::FamilyFee => Some((50.0, 3_000.0)),
            Parameter::LoanAmount => Some((10_000.0, 500_000.0)),
            Parameter::RepaymentMonths => Some((12.0, 240.0)),
            Parameter::LoanTakeRate => Some((1.0, 100.0)),
            Parameter::InitialBalance => None,
        }
    }

    /// Reporting granularity of a found value
    pub fn granularity(&self) -> f64 {
        match self {
            Parameter::FamilyFee => 10.0,
            Parameter::LoanAmount => 5_000.0,
            Parameter::RepaymentMonths => 12.0,
            Parameter::LoanTakeRate => 1.0,
            Parameter::InitialBalance => INITIAL_BALANCE_STEP,
        }
    }

    /// Effect on the minimum balance as the parameter grows
    pub fn direction(&self) -> Direction {
        match self {
            Parameter::FamilyFee | Parameter::InitialBalance => Direction::Increases,
            Parameter::LoanAmount | Parameter::RepaymentMonths | Parameter::LoanTakeRate => Direction::Decreases,
        }
    }

    pub fn max_iterations(&self) -> u32 {
        match self {
            Parameter::FamilyFee | Parameter::LoanAmount => 40,
            Parameter::RepaymentMonths | Parameter::LoanTakeRate => 30,
            Parameter::InitialBalance => 0,
        }
    }

    /// Default bisection settings driving the minimum balance to zero
    pub fn search_settings(&self, tolerance: f64) -> Option<SearchSettings> {
        let (lo, hi) = self.default_range()?;
        Some(SearchSettings {
            lo,
            hi,
            target: 0.0,
            tolerance,
            max_iterations: self.max_iterations(),
            direction: self.direction(),
        })
    }

    /// Value in the configuration today, read from the first yearly row where the
    /// parameter lives in the yearly table
    pub fn current_value(&self, config: &FundConfig) -> Option<f64> {
        let first = config.yearly_params.first();
        match self {
            Parameter::FamilyFee => first.map(|r| r.family_monthly_fee),
            Parameter::LoanAmount => first.map(|r| r.loan_amount),
            Parameter::RepaymentMonths => first.map(|r| r.repayment_months as f64),
            Parameter::LoanTakeRate => first.map(|r| r.loan_take_rate_pct),
            Parameter::InitialBalance => Some(config.settings.initial_balance),
        }
    }

    /// Copy of `config` with this parameter set to `value` everywhere it applies.
    ///
    /// Loan amount and repayment term also replace the existing members' values;
    /// the repayment term is truncated to whole months.
    pub fn apply(&self, config: &FundConfig, value: f64) -> FundConfig {
        let mut config = config.clone();
        match self {
            Parameter::FamilyFee => {
                for row in config.yearly_params.rows_mut() {
                    row.family_monthly_fee = value;
                }
            }
            Parameter::LoanAmount => {
                for row in config.yearly_params.rows_mut() {
                    row.loan_amount = value;
                }
                config.settings.existing_loan_amount = value;
            }
            Parameter::RepaymentMonths => {
                let months = value.max(0.0) as u32;
                for row in config.yearly_params.rows_mut() {
                    row.repayment_months = months;
                }
                config.settings.existing_repayment_months = months;
            }
            Parameter::LoanTakeRate => {
                for row in config.yearly_params.rows_mut() {
                    row.loan_take_rate_pct = value;
                }
            }
            Parameter::InitialBalance => {
                config.settings.initial_balance = value;
            }
        }
        config
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_family_fee_touches_every_row() {
        let config = FundConfig::default_community();
        let updated = Parameter::FamilyFee.apply(&config, 450.0);
        assert!(updated.yearly_params.rows().iter().all(|r| r.family_monthly_fee == 450.0));
        // Input config untouched
        assert_eq!(config.yearly_params.rows()[0].family_monthly_fee, 300.0);
        assert_eq!(Parameter::FamilyFee.current_value(&updated), Some(450.0));
    }

    #[test]
    fn test_apply_loan_amount_includes_existing() {
        let config = FundConfig::default_community();
        let updated = Parameter::LoanAmount.apply(&config, 150_000.0);
        assert_eq!(updated.settings.existing_loan_amount, 150_000.0);
        assert!(updated.yearly_params.rows().iter().all(|r| r.loan_amount == 150_000.0));
    }

    #[test]
    fn test_apply_repayment_truncates_months() {
        let config = FundConfig::default_community();
        let updated = Parameter::RepaymentMonths.apply(&config, 126.9);
        assert_eq!(updated.settings.existing_repayment_months, 126);
        assert!(updated.yearly_params.rows().iter().all(|r| r.repayment_months == 126));
    }

    #[test]
    fn test_apply_take_rate_and_initial_balance() {
        let config = FundConfig::default_community();
        let updated = Parameter::LoanTakeRate.apply(&config, 7.5);
        assert!(updated.yearly_params.rows().iter().all(|r| r.loan_take_rate_pct == 7.5));
        assert_eq!(updated.settings.existing_loan_amount, config.settings.existing_loan_amount);

        let updated = Parameter::InitialBalance.apply(&config, 4_000_000.0);
        assert_eq!(updated.settings.initial_balance, 4_000_000.0);
    }

    #[test]
    fn test_search_settings_table() {
        let fee = Parameter::FamilyFee.search_settings(DEFAULT_TOLERANCE).unwrap();
        assert_eq!((fee.lo, fee.hi, fee.max_iterations), (50.0, 3_000.0, 40));
        assert_eq!(fee.direction, Direction::Increases);

        let months = Parameter::RepaymentMonths.search_settings(DEFAULT_TOLERANCE).unwrap();
        assert_eq!((months.lo, months.hi, months.max_iterations), (12.0, 240.0, 30));
        assert_eq!(months.direction, Direction::Decreases);

        assert!(Parameter::InitialBalance.search_settings(DEFAULT_TOLERANCE).is_none());
    }
}

//! Configuration inputs: loan cohort table, yearly parameters, distributions, scalar settings

mod data;
mod distribution;
pub mod loader;

pub use data::{
    default_existing_loans, GrowthColumn, LoanCohortRow, YearlyParameterRow, YearlyParameterTable,
};
pub use distribution::{DistributionEntry, MarriageAgeDistribution};
pub use loader::{LoadedInputs, DEFAULT_INPUTS_PATH};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::InputError;

/// Scalar settings of a fund projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundSettings {
    /// Base wedding age of new families' children, in years after the family joins
    pub wedding_age: i32,
    pub avg_children: f64,
    pub months_between_children: u32,
    pub existing_loan_amount: f64,
    pub existing_repayment_months: u32,
    pub initial_balance: f64,
    /// Share of a sub-cohort's paid fees refunded once borrowing ends, 0-100
    pub fee_refund_percentage: f64,
    pub start_year: i32,
    pub end_year: i32,
}

impl Default for FundSettings {
    fn default() -> Self {
        Self {
            wedding_age: 21,
            avg_children: 8.0,
            months_between_children: 30,
            existing_loan_amount: 100_000.0,
            existing_repayment_months: 100,
            initial_balance: 0.0,
            fee_refund_percentage: 90.0,
            start_year: 2026,
            end_year: 2075,
        }
    }
}

/// Complete, immutable configuration for one projection call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundConfig {
    pub existing_loans: Vec<LoanCohortRow>,
    pub yearly_params: YearlyParameterTable,
    pub existing_distribution: Option<MarriageAgeDistribution>,
    pub new_distribution: Option<MarriageAgeDistribution>,
    pub settings: FundSettings,
}

impl FundConfig {
    /// Default community configuration: existing cohorts 2026-2046, 4.2% family growth,
    /// no marriage-age spread
    pub fn default_community() -> Self {
        let settings = FundSettings::default();
        Self {
            existing_loans: default_existing_loans(),
            yearly_params: YearlyParameterTable::default_growth(
                settings.start_year,
                settings.end_year,
            ),
            existing_distribution: None,
            new_distribution: None,
            settings,
        }
    }

    /// Load inputs from the default location (data/inputs/)
    pub fn from_csv() -> Result<Self, InputError> {
        Self::from_csv_path(Path::new(DEFAULT_INPUTS_PATH))
    }

    /// Load inputs from a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, InputError> {
        let loaded = LoadedInputs::load_from(path)?;
        Ok(loaded.into_config())
    }

    /// Distribution problems the engine will not guard against
    pub fn distribution_warnings(&self) -> Vec<(&'static str, InputError)> {
        let mut warnings = Vec::new();
        if let Some(Err(e)) = self.existing_distribution.as_ref().map(|d| d.validate()) {
            warnings.push(("existing", e));
        }
        if let Some(Err(e)) = self.new_distribution.as_ref().map(|d| d.validate()) {
            warnings.push(("new", e));
        }
        warnings
    }
}

//! CSV/JSON input loader
//!
//! Loads fund configuration from a directory, by default data/inputs/:
//! - existing_loans.csv          loan_year,child_count,monthly_fee
//! - yearly_params.csv           year,new_joiners,loan_amount,repayment_months,loan_take_rate_pct,family_monthly_fee
//! - existing_distribution.csv   deviation_years,percentage   (optional)
//! - new_distribution.csv        deviation_years,percentage   (optional)
//! - settings.json               scalar settings              (optional, missing keys use defaults)

use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{
    DistributionEntry, FundConfig, FundSettings, LoanCohortRow, MarriageAgeDistribution,
    YearlyParameterRow, YearlyParameterTable,
};
use crate::error::InputError;

/// Default path to the inputs directory
pub const DEFAULT_INPUTS_PATH: &str = "data/inputs";

fn csv_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, InputError> {
    let display = path.display().to_string();
    let file = File::open(path).map_err(|source| InputError::Io {
        path: display.clone(),
        source,
    })?;
    read_csv_rows(file, &display)
}

fn read_csv_rows<T: DeserializeOwned, R: Read>(reader: R, label: &str) -> Result<Vec<T>, InputError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();

    for result in csv_reader.deserialize() {
        let row: T = result.map_err(|source| InputError::Csv {
            path: label.to_string(),
            source,
        })?;
        rows.push(row);
    }

    Ok(rows)
}

/// Load the existing loan cohort table
pub fn load_existing_loans(path: &Path) -> Result<Vec<LoanCohortRow>, InputError> {
    csv_rows(&path.join("existing_loans.csv"))
}

/// Load existing loan cohorts from any reader (e.g., string buffer)
pub fn load_existing_loans_from_reader<R: Read>(reader: R) -> Result<Vec<LoanCohortRow>, InputError> {
    read_csv_rows(reader, "<reader>")
}

/// Load the yearly parameter table for new families
pub fn load_yearly_params(path: &Path) -> Result<YearlyParameterTable, InputError> {
    let rows: Vec<YearlyParameterRow> = csv_rows(&path.join("yearly_params.csv"))?;
    Ok(YearlyParameterTable::new(rows))
}

/// Load yearly parameters from any reader
pub fn load_yearly_params_from_reader<R: Read>(reader: R) -> Result<YearlyParameterTable, InputError> {
    Ok(YearlyParameterTable::new(read_csv_rows(reader, "<reader>")?))
}

/// Load an optional distribution table; a missing file means no spread
pub fn load_distribution(path: &Path, file_name: &str) -> Result<Option<MarriageAgeDistribution>, InputError> {
    let file_path = path.join(file_name);
    if !file_path.exists() {
        return Ok(None);
    }
    let entries: Vec<DistributionEntry> = csv_rows(&file_path)?;
    Ok(Some(MarriageAgeDistribution::new(entries)))
}

/// Load scalar settings; a missing file means defaults
pub fn load_settings(path: &Path) -> Result<FundSettings, InputError> {
    let file_path = path.join("settings.json");
    if !file_path.exists() {
        return Ok(FundSettings::default());
    }
    let display = file_path.display().to_string();
    let file = File::open(&file_path).map_err(|source| InputError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_reader(file).map_err(|source| InputError::Settings {
        path: display,
        source,
    })
}

/// All inputs loaded from one directory
pub struct LoadedInputs {
    pub existing_loans: Vec<LoanCohortRow>,
    pub yearly_params: YearlyParameterTable,
    pub existing_distribution: Option<MarriageAgeDistribution>,
    pub new_distribution: Option<MarriageAgeDistribution>,
    pub settings: FundSettings,
}

impl LoadedInputs {
    /// Load all inputs from the default path
    pub fn load_default() -> Result<Self, InputError> {
        Self::load_from(Path::new(DEFAULT_INPUTS_PATH))
    }

    /// Load all inputs from a specific path
    pub fn load_from(path: &Path) -> Result<Self, InputError> {
        let loaded = Self {
            existing_loans: load_existing_loans(path)?,
            yearly_params: load_yearly_params(path)?,
            existing_distribution: load_distribution(path, "existing_distribution.csv")?,
            new_distribution: load_distribution(path, "new_distribution.csv")?,
            settings: load_settings(path)?,
        };
        log::debug!(
            "loaded {} existing cohorts and {} yearly rows from {}",
            loaded.existing_loans.len(),
            loaded.yearly_params.rows().len(),
            path.display()
        );
        Ok(loaded)
    }

    pub fn into_config(self) -> FundConfig {
        FundConfig {
            existing_loans: self.existing_loans,
            yearly_params: self.yearly_params,
            existing_distribution: self.existing_distribution,
            new_distribution: self.new_distribution,
            settings: self.settings,
        }
    }
}

//! Scenario runner for repeated projections
//!
//! Holds one base configuration and re-runs the full pipeline for it, for a single
//! parameter override, or for a batch of alternative configurations. Every run is an
//! independent simulation from the start year; nothing is carried between runs.

use crate::calibration::{Parameter, Scope};
use crate::inputs::FundConfig;
use crate::error::InputError;
use crate::projection::{min_balance, ProjectionEngine, ProjectionSet};

/// Pre-loaded scenario runner
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv()?;
///
/// for fee in [250.0, 300.0, 350.0] {
///     let set = runner.run_with(Parameter::FamilyFee, fee);
///     println!("{fee}: {:.0}", set.min_combined_balance());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base_config: FundConfig,
}

impl ScenarioRunner {
    /// Create runner with the default community configuration
    pub fn new() -> Self {
        Self {
            base_config: FundConfig::default_community(),
        }
    }

    /// Create runner by loading inputs from data/inputs/
    pub fn from_csv() -> Result<Self, InputError> {
        Ok(Self {
            base_config: FundConfig::from_csv()?,
        })
    }

    /// Create runner from a specific inputs directory
    pub fn from_csv_path(path: &std::path::Path) -> Result<Self, InputError> {
        Ok(Self {
            base_config: FundConfig::from_csv_path(path)?,
        })
    }

    pub fn with_config(config: FundConfig) -> Self {
        Self { base_config: config }
    }

    /// Run the full pipeline on the base configuration
    pub fn run(&self) -> ProjectionSet {
        ProjectionEngine::new(&self.base_config).project()
    }

    /// Run the full pipeline with one parameter substituted
    pub fn run_with(&self, parameter: Parameter, value: f64) -> ProjectionSet {
        let config = parameter.apply(&self.base_config, value);
        ProjectionEngine::new(&config).project()
    }

    /// Run alternative configurations one after another
    pub fn run_scenarios(&self, configs: &[FundConfig]) -> Vec<ProjectionSet> {
        configs
            .iter()
            .map(|config| ProjectionEngine::new(config).project())
            .collect()
    }

    /// Minimum balance of the base configuration in the given scope
    pub fn min_balance(&self, scope: Scope) -> f64 {
        scope_min_balance(&self.base_config, scope)
    }

    /// Minimum balance with one parameter substituted
    pub fn min_balance_with(&self, parameter: Parameter, value: f64, scope: Scope) -> f64 {
        scope_min_balance(&parameter.apply(&self.base_config, value), scope)
    }

    pub fn config(&self) -> &FundConfig {
        &self.base_config
    }

    pub fn config_mut(&mut self) -> &mut FundConfig {
        &mut self.base_config
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// New-only scope projects new families alone; combined runs the whole pipeline
fn scope_min_balance(config: &FundConfig, scope: Scope) -> f64 {
    let engine = ProjectionEngine::new(config);
    match scope {
        Scope::NewOnly => min_balance(&engine.project_new_families()),
        Scope::Combined => engine.project().min_combined_balance(),
    }
}

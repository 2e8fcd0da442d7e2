//! Projection engine running the full pipeline for one configuration

use serde::{Deserialize, Serialize};

use super::cashflows::{
    min_balance, CombinedYearRow, ExistingYearRow, NewFamilyYearRow, ProjectionSummary,
};
use super::cohorts::{project_new_families, FamilyProfile};
use super::existing::project_existing;
use super::merge::merge_projections;
use crate::inputs::FundConfig;

/// The three yearly series produced by one projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSet {
    pub existing: Vec<ExistingYearRow>,
    pub new_families: Vec<NewFamilyYearRow>,
    pub combined: Vec<CombinedYearRow>,
}

impl ProjectionSet {
    pub fn min_existing_balance(&self) -> f64 {
        min_balance(&self.existing)
    }

    pub fn min_new_balance(&self) -> f64 {
        min_balance(&self.new_families)
    }

    pub fn min_combined_balance(&self) -> f64 {
        min_balance(&self.combined)
    }

    pub fn combined_summary(&self) -> ProjectionSummary {
        ProjectionSummary::from_rows(&self.combined)
    }
}

/// Main projection engine
pub struct ProjectionEngine<'a> {
    config: &'a FundConfig,
}

impl<'a> ProjectionEngine<'a> {
    pub fn new(config: &'a FundConfig) -> Self {
        Self { config }
    }

    pub fn family_profile(&self) -> FamilyProfile {
        let s = &self.config.settings;
        FamilyProfile {
            wedding_age: s.wedding_age,
            avg_children: s.avg_children,
            months_between_children: s.months_between_children,
            fee_refund_pct: s.fee_refund_percentage,
        }
    }

    pub fn project_existing(&self) -> Vec<ExistingYearRow> {
        let s = &self.config.settings;
        project_existing(
            &self.config.existing_loans,
            s.existing_loan_amount,
            s.existing_repayment_months,
            s.start_year,
            s.end_year,
            self.config.existing_distribution.as_ref(),
        )
    }

    pub fn project_new_families(&self) -> Vec<NewFamilyYearRow> {
        let s = &self.config.settings;
        project_new_families(
            &self.config.yearly_params,
            &self.family_profile(),
            s.start_year,
            s.end_year,
            self.config.new_distribution.as_ref(),
        )
    }

    /// Run existing and new-family projections and merge them
    pub fn project(&self) -> ProjectionSet {
        let existing = self.project_existing();
        let new_families = self.project_new_families();
        let combined = merge_projections(&existing, &new_families, self.config.settings.initial_balance);

        ProjectionSet {
            existing,
            new_families,
            combined,
        }
    }
}

//! Cohort-based cash-flow projection for existing members and new families

mod cashflows;
mod cohorts;
mod engine;
mod existing;
mod merge;
mod obligations;

pub use cashflows::{
    display_window, min_balance, CombinedYearRow, ExistingYearRow, FlowBreakdown,
    NewFamilyYearRow, ProjectionSummary, YearlyResult,
};
pub use cohorts::{project_new_families, FamilyProfile, MIN_BORROWING_YEARS};
pub use engine::{ProjectionEngine, ProjectionSet};
pub use existing::project_existing;
pub use merge::merge_projections;
pub use obligations::{FeeObligation, LoanObligation};

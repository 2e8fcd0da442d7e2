//! Cash flow of new families joining over time, modeled as cohorts split into
//! sub-cohorts by marriage-age deviation

use serde::{Deserialize, Serialize};

use super::cashflows::{FlowBreakdown, NewFamilyYearRow};
use super::obligations::{collect_installments, LoanObligation};
use crate::inputs::{MarriageAgeDistribution, YearlyParameterTable};

/// Minimum length of a family's borrowing window in years
pub const MIN_BORROWING_YEARS: f64 = 20.0;

/// Demographic assumptions shared by all new families
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FamilyProfile {
    /// Years from joining until the first child's wedding
    pub wedding_age: i32,
    pub avg_children: f64,
    pub months_between_children: u32,
    /// Share of paid fees refunded once the borrowing window closes, 0-100
    pub fee_refund_pct: f64,
}

impl FamilyProfile {
    pub fn years_between_children(&self) -> f64 {
        self.months_between_children as f64 / 12.0
    }

    /// Length of the window in which a family's children marry and borrow
    pub fn borrowing_years(&self) -> f64 {
        MIN_BORROWING_YEARS.max(self.avg_children * self.years_between_children())
    }

    pub fn loans_per_year_per_family(&self) -> f64 {
        self.avg_children / self.borrowing_years()
    }
}

/// Fraction of a joining cohort sharing one marriage-age deviation
#[derive(Debug)]
struct SubCohort {
    join_year: i32,
    deviation: i32,
    size: f64,
    effective_wedding_age: i32,
    fees_paid: f64,
    refunded: bool,
    loans: Vec<LoanObligation>,
}

/// All families joining in one year
#[derive(Debug)]
struct Cohort {
    join_year: i32,
    sub_cohorts: Vec<SubCohort>,
}

impl Cohort {
    fn new(join_year: i32, joiners: f64, wedding_age: i32, buckets: &[(i32, f64)]) -> Self {
        let sub_cohorts = buckets
            .iter()
            .filter(|(_, fraction)| *fraction > 0.0)
            .map(|&(deviation, fraction)| SubCohort {
                join_year,
                deviation,
                size: joiners * fraction,
                effective_wedding_age: wedding_age + deviation,
                fees_paid: 0.0,
                refunded: false,
                loans: Vec::new(),
            })
            .collect();
        Self { join_year, sub_cohorts }
    }
}

/// Project new-family cohorts from `start_year` through `end_year`.
///
/// A year without a parameter row produces no output row and advances nothing.
pub fn project_new_families(
    params: &YearlyParameterTable,
    family: &FamilyProfile,
    start_year: i32,
    end_year: i32,
    distribution: Option<&MarriageAgeDistribution>,
) -> Vec<NewFamilyYearRow> {
    let buckets = MarriageAgeDistribution::resolve(distribution);
    let borrowing_years = family.borrowing_years();
    let loans_per_year = family.loans_per_year_per_family();
    let refund_rate = family.fee_refund_pct / 100.0;

    let mut cohorts: Vec<Cohort> = Vec::new();
    let mut rows = Vec::new();
    let mut cumulative_joined = 0.0;
    let mut cumulative_balance = 0.0;

    for year in start_year..=end_year {
        let Some(row) = params.row_for(year) else {
            log::warn!("no yearly parameters for {year}, year skipped");
            continue;
        };
        let repayment_years = row.repayment_years();
        let take_rate = row.loan_take_rate_pct / 100.0;
        let yearly_fee = row.family_monthly_fee * 12.0;

        if row.new_joiners > 0.0 {
            cohorts.push(Cohort::new(year, row.new_joiners, family.wedding_age, &buckets));
            cumulative_joined += row.new_joiners;
        }

        let mut flows = FlowBreakdown::default();
        let mut borrowing_payers = 0.0;

        for cohort in &mut cohorts {
            for sub in &mut cohort.sub_cohorts {
                let age = (year - sub.join_year) as f64;
                let wedding_age = sub.effective_wedding_age as f64;
                let membership_years = wedding_age + borrowing_years + repayment_years;
                let borrowing_end = wedding_age + borrowing_years;

                // Refund covers fees from earlier years only; a skipped boundary
                // year pays out in the next projected year
                if refund_rate > 0.0 && !sub.refunded && age >= borrowing_end.round_ties_even() {
                    let refund = sub.fees_paid * refund_rate;
                    flows.grants_amount += refund;
                    flows.grants_count += sub.size;
                    sub.refunded = true;
                    log::trace!(
                        "refund for cohort {} deviation {:+} in {year}: {refund:.0}",
                        cohort.join_year,
                        sub.deviation,
                    );
                }

                let paying = age >= 0.0 && age < membership_years;
                if paying {
                    let fee = sub.size * yearly_fee;
                    flows.fees += fee;
                    flows.fee_payers += sub.size;
                    sub.fees_paid += fee;
                }

                if age >= wedding_age && age < borrowing_end {
                    let loans = sub.size * loans_per_year * take_rate;
                    let amount = loans * row.loan_amount;
                    flows.loans_given_count += loans;
                    flows.loans_given_amount += amount;
                    sub.loans.push(LoanObligation::new(year, amount, repayment_years));
                    if paying {
                        borrowing_payers += sub.size;
                    }
                }

                flows.loan_repayments += collect_installments(&mut sub.loans);
            }
        }

        flows.settle();
        cumulative_balance += flows.net;

        let borrowing_fraction = if flows.fee_payers > 0.0 {
            borrowing_payers / flows.fee_payers
        } else {
            0.0
        };

        rows.push(NewFamilyYearRow {
            year,
            new_joiners: row.new_joiners,
            cumulative_joined,
            borrowing_fraction,
            flows,
            cumulative_balance,
        });
    }

    log::debug!(
        "new-family projection: {} cohorts over {} years, final balance {:.0}",
        cohorts.len(),
        rows.len(),
        cumulative_balance
    );

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::{DistributionEntry, YearlyParameterRow};
    use approx::assert_relative_eq;

    fn constant_params(start: i32, end: i32) -> YearlyParameterTable {
        YearlyParameterTable::constant(
            start,
            end,
            YearlyParameterRow {
                year: start,
                new_joiners: 100.0,
                loan_amount: 100_000.0,
                repayment_months: 100,
                loan_take_rate_pct: 100.0,
                family_monthly_fee: 300.0,
            },
        )
    }

    fn profile(fee_refund_pct: f64) -> FamilyProfile {
        FamilyProfile {
            wedding_age: 21,
            avg_children: 8.0,
            months_between_children: 30,
            fee_refund_pct,
        }
    }

    #[test]
    fn test_derived_constants() {
        let family = profile(0.0);
        assert_relative_eq!(family.years_between_children(), 2.5);
        assert_relative_eq!(family.borrowing_years(), 20.0);
        assert_relative_eq!(family.loans_per_year_per_family(), 0.4);

        let spread = FamilyProfile { avg_children: 10.0, ..family };
        assert_relative_eq!(spread.borrowing_years(), 25.0);
    }

    #[test]
    fn test_no_loans_before_wedding_age() {
        let rows = project_new_families(&constant_params(2026, 2075), &profile(0.0), 2026, 2075, None);

        assert_relative_eq!(rows[0].flows.fee_payers, 100.0);
        assert_relative_eq!(rows[0].flows.fees, 100.0 * 300.0 * 12.0);
        assert!(rows.iter().filter(|r| r.year < 2047).all(|r| r.flows.loans_given_amount == 0.0));

        let first_loans = rows.iter().find(|r| r.year == 2047).unwrap();
        // Only the 2026 cohort borrows: 100 * 0.4 loans
        assert_relative_eq!(first_loans.flows.loans_given_count, 40.0);
        assert_relative_eq!(first_loans.flows.loans_given_amount, 4_000_000.0);
        assert_relative_eq!(first_loans.flows.loan_repayments, 4_000_000.0 * 12.0 / 100.0, max_relative = 1e-12);
    }

    #[test]
    fn test_cumulative_joined_and_borrowing_fraction() {
        let rows = project_new_families(&constant_params(2026, 2075), &profile(0.0), 2026, 2075, None);
        assert_relative_eq!(rows[9].cumulative_joined, 1_000.0);
        assert_eq!(rows[0].borrowing_fraction, 0.0);

        // In 2047 one of 22 paying cohorts is borrowing
        let row = rows.iter().find(|r| r.year == 2047).unwrap();
        assert_relative_eq!(row.borrowing_fraction, 1.0 / 22.0, max_relative = 1e-12);
    }

    #[test]
    fn test_fee_window_covers_last_repayment() {
        // Single cohort: membership = 21 + 20 + 8.33 = 49.33 years -> ages 0..=49
        let mut params = constant_params(2026, 2090);
        for row in params.rows_mut().iter_mut().skip(1) {
            row.new_joiners = 0.0;
        }
        let rows = project_new_families(&params, &profile(0.0), 2026, 2090, None);

        let last_fee_year = rows.iter().filter(|r| r.flows.fees > 0.0).map(|r| r.year).max();
        assert_eq!(last_fee_year, Some(2026 + 49));

        let last_repayment_year = rows
            .iter()
            .filter(|r| r.flows.loan_repayments > 0.0)
            .map(|r| r.year)
            .max()
            .unwrap();
        // Last loan in age 40 (2066), 9 installments through 2074
        assert_eq!(last_repayment_year, 2074);
        assert!(last_fee_year.unwrap() >= last_repayment_year);
    }

    #[test]
    fn test_fee_refund_paid_once() {
        let mut params = constant_params(2026, 2090);
        for row in params.rows_mut().iter_mut().skip(1) {
            row.new_joiners = 0.0;
        }
        let rows = project_new_families(&params, &profile(90.0), 2026, 2090, None);

        let grants: Vec<&NewFamilyYearRow> = rows.iter().filter(|r| r.flows.grants_amount > 0.0).collect();
        assert_eq!(grants.len(), 1);
        // Refund at age round(21 + 20) = 41 covers the 41 fee years before it (ages 0..=40)
        assert_eq!(grants[0].year, 2067);
        assert_relative_eq!(grants[0].flows.grants_amount, 41.0 * 100.0 * 3_600.0 * 0.9, max_relative = 1e-12);
        assert_relative_eq!(grants[0].flows.grants_count, 100.0);
        // The refund year itself still pays its fee
        assert_relative_eq!(grants[0].flows.fees, 100.0 * 3_600.0);
    }

    fn single_cohort_params(start: i32, end: i32) -> YearlyParameterTable {
        let mut params = constant_params(start, end);
        for row in params.rows_mut().iter_mut().skip(1) {
            row.new_joiners = 0.0;
        }
        params
    }

    #[test]
    fn test_refund_boundary_rounds_half_to_even() {
        // 2 children 129 months apart: borrowing window 21.5 years, boundary 42.5 -> 42
        let family = FamilyProfile {
            wedding_age: 21,
            avg_children: 2.0,
            months_between_children: 129,
            fee_refund_pct: 100.0,
        };
        assert_relative_eq!(family.borrowing_years(), 21.5);

        let rows = project_new_families(&single_cohort_params(2026, 2090), &family, 2026, 2090, None);
        let grants: Vec<&NewFamilyYearRow> = rows.iter().filter(|r| r.flows.grants_amount > 0.0).collect();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].year, 2026 + 42);
        assert_relative_eq!(grants[0].flows.grants_amount, 42.0 * 100.0 * 3_600.0, max_relative = 1e-12);
    }

    #[test]
    fn test_refund_paid_after_skipped_boundary_year() {
        let rows: Vec<YearlyParameterRow> = single_cohort_params(2026, 2090)
            .rows()
            .iter()
            .copied()
            .filter(|r| r.year != 2067)
            .collect();
        let table = YearlyParameterTable::new(rows);
        let result = project_new_families(&table, &profile(90.0), 2026, 2090, None);

        let grants: Vec<&NewFamilyYearRow> = result.iter().filter(|r| r.flows.grants_amount > 0.0).collect();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].year, 2068);
        // 2067 was never projected, so only ages 0..=40 paid fees before the refund
        assert_relative_eq!(grants[0].flows.grants_amount, 41.0 * 100.0 * 3_600.0 * 0.9, max_relative = 1e-12);
    }

    #[test]
    fn test_no_refund_when_percentage_zero() {
        let rows = project_new_families(&constant_params(2026, 2075), &profile(0.0), 2026, 2075, None);
        assert!(rows.iter().all(|r| r.flows.grants_amount == 0.0));
    }

    #[test]
    fn test_distribution_splits_wedding_age() {
        let mut params = constant_params(2026, 2075);
        for row in params.rows_mut().iter_mut().skip(1) {
            row.new_joiners = 0.0;
        }
        let dist = MarriageAgeDistribution::new(vec![
            DistributionEntry::new(-1, 25.0),
            DistributionEntry::new(1, 50.0),
        ]);
        let rows = project_new_families(&params, &profile(0.0), 2026, 2075, Some(&dist));

        let given = |year: i32| rows.iter().find(|r| r.year == year).unwrap().flows.loans_given_count;
        assert_eq!(given(2045), 0.0);
        assert_relative_eq!(given(2046), 25.0 * 0.4);
        assert_relative_eq!(given(2047), 25.0 * 0.4);
        assert_relative_eq!(given(2048), 75.0 * 0.4, max_relative = 1e-12);
        // The 25% remainder pays nothing and never borrows
        assert_relative_eq!(rows[0].flows.fee_payers, 75.0);
    }

    #[test]
    fn test_single_bucket_distribution_matches_none() {
        let params = YearlyParameterTable::default_growth(2026, 2075);
        let plain = project_new_families(&params, &profile(90.0), 2026, 2075, None);
        let single = MarriageAgeDistribution::single_age();
        let split = project_new_families(&params, &profile(90.0), 2026, 2075, Some(&single));
        assert_eq!(plain, split);
    }

    #[test]
    fn test_missing_parameter_year_is_skipped() {
        let rows: Vec<YearlyParameterRow> = constant_params(2026, 2030)
            .rows()
            .iter()
            .copied()
            .filter(|r| r.year != 2028)
            .collect();
        let table = YearlyParameterTable::new(rows);
        let result = project_new_families(&table, &profile(0.0), 2026, 2030, None);

        let years: Vec<i32> = result.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2026, 2027, 2029, 2030]);
        // 2029 still sees the two earlier cohorts plus its own
        assert_relative_eq!(result[2].flows.fee_payers, 300.0);
    }

    #[test]
    fn test_cumulative_balance_is_prefix_sum() {
        let params = YearlyParameterTable::default_growth(2026, 2075);
        let rows = project_new_families(&params, &profile(90.0), 2026, 2075, None);
        let mut running = 0.0;
        for row in &rows {
            running += row.flows.net;
            assert_relative_eq!(row.cumulative_balance, running);
        }
    }
}

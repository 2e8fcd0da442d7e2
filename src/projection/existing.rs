//! Cash flow of existing members: historical cohorts with a fixed loan schedule

use std::collections::BTreeMap;

use super::cashflows::{ExistingYearRow, FlowBreakdown};
use super::obligations::{collect_installments, FeeObligation, LoanObligation};
use crate::inputs::{LoanCohortRow, MarriageAgeDistribution};

/// A loan scheduled inside the horizon, waiting for its disbursement year
#[derive(Debug)]
struct Disbursement {
    borrowers: f64,
    obligation: LoanObligation,
}

/// Project existing members' loans and fees from `start_year` through `end_year`.
///
/// Each cohort row is split by the distribution into sub-groups borrowing in
/// `loan_year + deviation`. Loans disbursed before `start_year` only contribute the
/// remainder of their repayment; loans inside the horizon are disbursed in their year
/// and charge their first installment in that same year. Every sub-group pays fees
/// from `start_year` through the year its repayment ends.
pub fn project_existing(
    cohorts: &[LoanCohortRow],
    loan_amount: f64,
    repayment_months: u32,
    start_year: i32,
    end_year: i32,
    distribution: Option<&MarriageAgeDistribution>,
) -> Vec<ExistingYearRow> {
    let repayment_years = repayment_months as f64 / 12.0;
    let buckets = MarriageAgeDistribution::resolve(distribution);

    let mut scheduled: BTreeMap<i32, Vec<Disbursement>> = BTreeMap::new();
    let mut active: Vec<LoanObligation> = Vec::new();
    let mut fee_obligations: Vec<FeeObligation> = Vec::new();

    for cohort in cohorts {
        for &(deviation, fraction) in &buckets {
            let size = cohort.child_count * fraction;
            if size <= 0.0 {
                continue;
            }
            let loan_year = cohort.loan_year + deviation;
            let principal = size * loan_amount;

            if loan_year < start_year {
                let remaining = repayment_years - (start_year - loan_year) as f64;
                if remaining <= 0.0 {
                    continue;
                }
                active.push(LoanObligation::in_progress(loan_year, principal, repayment_years, remaining));
            } else {
                scheduled.entry(loan_year).or_default().push(Disbursement {
                    borrowers: size,
                    obligation: LoanObligation::new(loan_year, principal, repayment_years),
                });
            }

            fee_obligations.push(FeeObligation {
                start_year,
                end_year: (loan_year as f64 + repayment_years).floor() as i32,
                yearly_amount: size * cohort.monthly_fee * 12.0,
                payers: size,
            });
        }
    }

    log::debug!(
        "existing projection: {} loans in progress, {} disbursement years, {} fee groups ({} payer-years)",
        active.len(),
        scheduled.len(),
        fee_obligations.len(),
        fee_obligations
            .iter()
            .map(|f| f.payers * f.remaining_years(start_year) as f64)
            .sum::<f64>()
    );

    let mut rows = Vec::with_capacity((end_year - start_year + 1).max(0) as usize);
    let mut cumulative_balance = 0.0;

    for year in start_year..=end_year {
        let mut flows = FlowBreakdown::default();

        if let Some(batch) = scheduled.remove(&year) {
            for disbursement in batch {
                flows.loans_given_count += disbursement.borrowers;
                flows.loans_given_amount += disbursement.obligation.principal;
                active.push(disbursement.obligation);
            }
        }

        flows.loan_repayments = collect_installments(&mut active);

        for fee in fee_obligations.iter().filter(|f| f.is_due(year)) {
            flows.fees += fee.yearly_amount;
            flows.fee_payers += fee.payers;
        }

        flows.settle();
        cumulative_balance += flows.net;

        rows.push(ExistingYearRow {
            year,
            flows,
            cumulative_balance,
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::DistributionEntry;
    use approx::assert_relative_eq;

    fn single_cohort() -> Vec<LoanCohortRow> {
        vec![LoanCohortRow::new(2026, 80.0, 50.0)]
    }

    #[test]
    fn test_first_installment_in_disbursement_year() {
        let rows = project_existing(&single_cohort(), 100_000.0, 100, 2026, 2075, None);
        let first = &rows[0];

        assert_eq!(first.year, 2026);
        assert_relative_eq!(first.flows.loans_given_count, 80.0);
        assert_relative_eq!(first.flows.money_out, 8_000_000.0);
        // 80 loans * 100,000 / (100 / 12) years
        assert_relative_eq!(first.flows.loan_repayments, 960_000.0, max_relative = 1e-12);
        assert_relative_eq!(first.flows.fees, 80.0 * 50.0 * 12.0);
    }

    #[test]
    fn test_repayment_count_and_overshoot() {
        let rows = project_existing(&single_cohort(), 100_000.0, 100, 2026, 2075, None);
        let paying_years = rows.iter().filter(|r| r.flows.loan_repayments > 0.0).count();
        assert_eq!(paying_years, 9);

        let total: f64 = rows.iter().map(|r| r.flows.loan_repayments).sum();
        let years = 100.0_f64 / 12.0;
        assert_relative_eq!(total, 8_000_000.0 / years * years.ceil(), max_relative = 1e-12);
    }

    #[test]
    fn test_fee_window_ends_with_repayment() {
        let rows = project_existing(&single_cohort(), 100_000.0, 100, 2026, 2075, None);
        // 2026 + 8.33 -> fees through 2034 inclusive
        let last_fee_year = rows.iter().filter(|r| r.flows.fees > 0.0).map(|r| r.year).max();
        assert_eq!(last_fee_year, Some(2034));
        assert_relative_eq!(rows[8].flows.fee_payers, 80.0);
        assert_eq!(rows[9].flows.fee_payers, 0.0);
    }

    #[test]
    fn test_loan_before_horizon_tracks_tail_only() {
        let cohorts = vec![LoanCohortRow::new(2023, 10.0, 50.0)];
        // 10-year term, 3 years already elapsed -> 7 installments, no disbursement
        let rows = project_existing(&cohorts, 120_000.0, 120, 2026, 2040, None);

        assert!(rows.iter().all(|r| r.flows.loans_given_amount == 0.0));
        let paying: Vec<i32> = rows
            .iter()
            .filter(|r| r.flows.loan_repayments > 0.0)
            .map(|r| r.year)
            .collect();
        assert_eq!(paying, (2026..=2032).collect::<Vec<_>>());
        assert_relative_eq!(rows[0].flows.loan_repayments, 120_000.0);
        // Fees from the horizon start through 2033
        assert_eq!(rows.iter().filter(|r| r.flows.fees > 0.0).count(), 8);
    }

    #[test]
    fn test_fully_repaid_before_horizon_is_skipped() {
        let cohorts = vec![LoanCohortRow::new(2010, 10.0, 50.0)];
        let rows = project_existing(&cohorts, 100_000.0, 120, 2026, 2030, None);
        assert!(rows.iter().all(|r| r.flows.money_in == 0.0 && r.flows.money_out == 0.0));
        assert!(rows.iter().all(|r| r.cumulative_balance == 0.0));
    }

    #[test]
    fn test_single_bucket_distribution_matches_none() {
        let cohorts = crate::inputs::default_existing_loans();
        let plain = project_existing(&cohorts, 100_000.0, 100, 2026, 2075, None);
        let single = MarriageAgeDistribution::new(vec![DistributionEntry::new(0, 100.0)]);
        let split = project_existing(&cohorts, 100_000.0, 100, 2026, 2075, Some(&single));
        assert_eq!(plain, split);
    }

    #[test]
    fn test_distribution_shifts_and_drops_remainder() {
        let cohorts = vec![LoanCohortRow::new(2030, 100.0, 50.0)];
        let dist = MarriageAgeDistribution::new(vec![
            DistributionEntry::new(-1, 30.0),
            DistributionEntry::new(2, 60.0),
        ]);
        let rows = project_existing(&cohorts, 10_000.0, 120, 2026, 2050, Some(&dist));

        let given = |year: i32| rows.iter().find(|r| r.year == year).map(|r| r.flows.loans_given_count);
        assert_relative_eq!(given(2029).unwrap(), 30.0);
        assert_relative_eq!(given(2030).unwrap(), 0.0);
        assert_relative_eq!(given(2032).unwrap(), 60.0);

        // 10% never borrow and are not fee payers either
        assert_relative_eq!(rows[0].flows.fee_payers, 90.0);
        let total_given: f64 = rows.iter().map(|r| r.flows.loans_given_amount).sum();
        assert_relative_eq!(total_given, 90.0 * 10_000.0);
    }

    #[test]
    fn test_cumulative_balance_is_prefix_sum() {
        let cohorts = crate::inputs::default_existing_loans();
        let rows = project_existing(&cohorts, 100_000.0, 100, 2026, 2075, None);
        assert_relative_eq!(rows[0].cumulative_balance, rows[0].flows.net);
        for pair in rows.windows(2) {
            assert_relative_eq!(
                pair[1].cumulative_balance - pair[0].cumulative_balance,
                pair[1].flows.net,
                epsilon = 1e-6
            );
        }
    }
}

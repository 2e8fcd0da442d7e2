//! Outer join of the existing and new-family series into one running balance

use std::collections::BTreeMap;

use super::cashflows::{CombinedYearRow, ExistingYearRow, FlowBreakdown, NewFamilyYearRow};

/// Merge both series by year; a year missing on one side counts as all-zero there.
///
/// `running_balance[y] = initial_balance + sum(net up to y)`.
pub fn merge_projections(
    existing: &[ExistingYearRow],
    new_families: &[NewFamilyYearRow],
    initial_balance: f64,
) -> Vec<CombinedYearRow> {
    let mut by_year: BTreeMap<i32, (Option<&ExistingYearRow>, Option<&NewFamilyYearRow>)> = BTreeMap::new();
    for row in existing {
        by_year.entry(row.year).or_default().0 = Some(row);
    }
    for row in new_families {
        by_year.entry(row.year).or_default().1 = Some(row);
    }

    let mut running_balance = initial_balance;
    by_year
        .into_iter()
        .map(|(year, (e, n))| {
            let existing = e.map(|r| r.flows).unwrap_or_default();
            let new_side = n.map(|r| r.flows).unwrap_or_default();
            let total: FlowBreakdown = existing + new_side;
            running_balance += total.net;

            CombinedYearRow {
                year,
                existing,
                new_families: new_side,
                new_joiners: n.map(|r| r.new_joiners).unwrap_or(0.0),
                total,
                running_balance,
            }
        })
        .collect()
}

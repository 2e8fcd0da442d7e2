//! Input table rows: existing loan cohorts and yearly parameters for new families

use serde::{Deserialize, Serialize};

/// One historical birth cohort of existing members' children, keyed by scheduled loan year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanCohortRow {
    /// Year the loan is scheduled (birth year + base wedding age)
    pub loan_year: i32,

    /// Number of children in the cohort (may be fractional)
    pub child_count: f64,

    /// Monthly membership fee paid per child
    pub monthly_fee: f64,
}

impl LoanCohortRow {
    pub fn new(loan_year: i32, child_count: f64, monthly_fee: f64) -> Self {
        Self { loan_year, child_count, monthly_fee }
    }
}

/// Per-calendar-year parameters for newly joining families
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyParameterRow {
    pub year: i32,

    /// Families joining this year
    pub new_joiners: f64,

    /// Principal of each loan disbursed this year
    pub loan_amount: f64,

    /// Repayment term of loans disbursed this year
    pub repayment_months: u32,

    /// Share of eligible children taking a loan, 0-100
    pub loan_take_rate_pct: f64,

    /// Monthly family membership fee
    pub family_monthly_fee: f64,
}

impl YearlyParameterRow {
    pub fn repayment_years(&self) -> f64 {
        self.repayment_months as f64 / 12.0
    }
}

/// Column of the yearly table that the growth tool can compound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthColumn {
    NewJoiners,
    LoanAmount,
    FamilyFee,
}

/// Ordered yearly parameter table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyParameterTable {
    rows: Vec<YearlyParameterRow>,
}

impl YearlyParameterTable {
    pub fn new(rows: Vec<YearlyParameterRow>) -> Self {
        Self { rows }
    }

    /// Default table: 100 new families in the first year growing 4.2% per year,
    /// 100,000 loans over 100 months, 11% take-rate and a 300 monthly fee.
    pub fn default_growth(start_year: i32, end_year: i32) -> Self {
        let rows = (start_year..=end_year)
            .enumerate()
            .map(|(i, year)| YearlyParameterRow {
                year,
                new_joiners: (100.0 * 1.042_f64.powi(i as i32)).trunc(),
                loan_amount: 100_000.0,
                repayment_months: 100,
                loan_take_rate_pct: 11.0,
                family_monthly_fee: 300.0,
            })
            .collect();
        Self { rows }
    }

    /// Same row values repeated for every year of the horizon
    pub fn constant(start_year: i32, end_year: i32, template: YearlyParameterRow) -> Self {
        let rows = (start_year..=end_year)
            .map(|year| YearlyParameterRow { year, ..template })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[YearlyParameterRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [YearlyParameterRow] {
        &mut self.rows
    }

    /// First row matching the calendar year
    pub fn row_for(&self, year: i32) -> Option<&YearlyParameterRow> {
        self.rows.iter().find(|r| r.year == year)
    }

    pub fn first(&self) -> Option<&YearlyParameterRow> {
        self.rows.first()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Compound a column from its first-row value: `value_i = trunc(base * (1 + rate/100)^i)`
    pub fn apply_growth(&mut self, column: GrowthColumn, rate_pct: f64) {
        let Some(first) = self.rows.first() else {
            return;
        };
        let base = match column {
            GrowthColumn::NewJoiners => first.new_joiners,
            GrowthColumn::LoanAmount => first.loan_amount,
            GrowthColumn::FamilyFee => first.family_monthly_fee,
        };
        let factor = 1.0 + rate_pct / 100.0;

        for (i, row) in self.rows.iter_mut().enumerate() {
            let value = (base * factor.powi(i as i32)).trunc();
            match column {
                GrowthColumn::NewJoiners => row.new_joiners = value,
                GrowthColumn::LoanAmount => row.loan_amount = value,
                GrowthColumn::FamilyFee => row.family_monthly_fee = value,
            }
        }
    }
}

/// Default existing cohorts: children born 2005-2025 borrowing in 2026-2046,
/// 80 children in the first cohort rising by 6 per year, 50 monthly fee each.
pub fn default_existing_loans() -> Vec<LoanCohortRow> {
    (0..21)
        .map(|i| LoanCohortRow::new(2026 + i, 80.0 + 6.0 * i as f64, 50.0))
        .collect()
}

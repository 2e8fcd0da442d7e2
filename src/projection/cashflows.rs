//! Yearly cashflow output structures for projections

use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Money-in / money-out components of one year.
///
/// Counts are fractional populations; nothing is rounded inside the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowBreakdown {
    pub loans_given_count: f64,
    pub loans_given_amount: f64,
    pub grants_count: f64,
    pub grants_amount: f64,
    pub loan_repayments: f64,
    pub fee_payers: f64,
    pub fees: f64,
    pub money_in: f64,
    pub money_out: f64,
    pub net: f64,
}

impl FlowBreakdown {
    /// Fill money_in, money_out and net from the components
    pub fn settle(&mut self) {
        self.money_in = self.loan_repayments + self.fees;
        self.money_out = self.loans_given_amount + self.grants_amount;
        self.net = self.money_in - self.money_out;
    }
}

impl Add for FlowBreakdown {
    type Output = FlowBreakdown;

    fn add(self, other: FlowBreakdown) -> FlowBreakdown {
        FlowBreakdown {
            loans_given_count: self.loans_given_count + other.loans_given_count,
            loans_given_amount: self.loans_given_amount + other.loans_given_amount,
            grants_count: self.grants_count + other.grants_count,
            grants_amount: self.grants_amount + other.grants_amount,
            loan_repayments: self.loan_repayments + other.loan_repayments,
            fee_payers: self.fee_payers + other.fee_payers,
            fees: self.fees + other.fees,
            money_in: self.money_in + other.money_in,
            money_out: self.money_out + other.money_out,
            net: self.net + other.net,
        }
    }
}

/// Common view over the three yearly series
pub trait YearlyResult {
    fn year(&self) -> i32;
    fn flows(&self) -> &FlowBreakdown;
    /// Cumulative balance (existing/new) or running balance (combined)
    fn balance(&self) -> f64;
}

/// Cash flow of existing members for one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingYearRow {
    pub year: i32,
    #[serde(flatten)]
    pub flows: FlowBreakdown,
    pub cumulative_balance: f64,
}

/// Cash flow of new-family cohorts for one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFamilyYearRow {
    pub year: i32,
    pub new_joiners: f64,

    /// Families joined from the start of the horizon through this year
    pub cumulative_joined: f64,

    /// Share of fee payers whose sub-cohort is inside its borrowing window
    pub borrowing_fraction: f64,

    #[serde(flatten)]
    pub flows: FlowBreakdown,
    pub cumulative_balance: f64,
}

/// Merged cash flow with per-side breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedYearRow {
    pub year: i32,
    pub existing: FlowBreakdown,
    pub new_families: FlowBreakdown,
    pub new_joiners: f64,
    pub total: FlowBreakdown,
    pub running_balance: f64,
}

impl YearlyResult for ExistingYearRow {
    fn year(&self) -> i32 {
        self.year
    }
    fn flows(&self) -> &FlowBreakdown {
        &self.flows
    }
    fn balance(&self) -> f64 {
        self.cumulative_balance
    }
}

impl YearlyResult for NewFamilyYearRow {
    fn year(&self) -> i32 {
        self.year
    }
    fn flows(&self) -> &FlowBreakdown {
        &self.flows
    }
    fn balance(&self) -> f64 {
        self.cumulative_balance
    }
}

impl YearlyResult for CombinedYearRow {
    fn year(&self) -> i32 {
        self.year
    }
    fn flows(&self) -> &FlowBreakdown {
        &self.total
    }
    fn balance(&self) -> f64 {
        self.running_balance
    }
}

/// Lowest balance over the horizon; 0 for an empty series
pub fn min_balance<R: YearlyResult>(rows: &[R]) -> f64 {
    rows.iter()
        .map(YearlyResult::balance)
        .reduce(f64::min)
        .unwrap_or(0.0)
}

/// Rows whose year falls inside a display window
pub fn display_window<R: YearlyResult>(rows: &[R], from: i32, to: i32) -> impl Iterator<Item = &R> {
    rows.iter().filter(move |r| r.year() >= from && r.year() <= to)
}

/// Summary statistics for a yearly series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_years: u32,
    pub total_money_in: f64,
    pub total_money_out: f64,
    pub total_loans_given: f64,
    pub final_balance: f64,
    pub min_balance: f64,
    pub min_balance_year: Option<i32>,
    pub first_negative_year: Option<i32>,
}

impl ProjectionSummary {
    pub fn from_rows<R: YearlyResult>(rows: &[R]) -> Self {
        let total_money_in: f64 = rows.iter().map(|r| r.flows().money_in).sum();
        let total_money_out: f64 = rows.iter().map(|r| r.flows().money_out).sum();
        let total_loans_given: f64 = rows.iter().map(|r| r.flows().loans_given_amount).sum();

        let lowest = rows
            .iter()
            .reduce(|best, r| if r.balance() < best.balance() { r } else { best });

        ProjectionSummary {
            total_years: rows.len() as u32,
            total_money_in,
            total_money_out,
            total_loans_given,
            final_balance: rows.last().map(|r| r.balance()).unwrap_or(0.0),
            min_balance: lowest.map(|r| r.balance()).unwrap_or(0.0),
            min_balance_year: lowest.map(|r| r.year()),
            first_negative_year: rows.iter().find(|r| r.balance() < 0.0).map(|r| r.year()),
        }
    }

    pub fn stays_solvent(&self) -> bool {
        self.first_negative_year.is_none()
    }
}

//! Loan and fee obligations tracked during a projection

/// Active repayment schedule for one disbursement event.
///
/// Repaid at 0% interest in equal annual installments of `principal / repayment_years`.
/// An installment is charged whenever `years_left > 0`, so a fractional term yields
/// `ceil(repayment_years)` installments and the total repaid can exceed the principal.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanObligation {
    /// Year the loan was disbursed (may precede the projection horizon)
    pub origin_year: i32,

    /// Amount disbursed (already scaled by population)
    pub principal: f64,

    /// Installment charged each year while the schedule is active
    pub yearly_payment: f64,

    /// Remaining repayment years, fractional
    pub years_left: f64,
}

impl LoanObligation {
    /// New schedule starting in the disbursement year
    pub fn new(origin_year: i32, principal: f64, repayment_years: f64) -> Self {
        Self {
            origin_year,
            principal,
            yearly_payment: principal / repayment_years,
            years_left: repayment_years,
        }
    }

    /// Schedule disbursed before the horizon with only `years_left` of repayment remaining
    pub fn in_progress(origin_year: i32, principal: f64, repayment_years: f64, years_left: f64) -> Self {
        Self {
            years_left,
            ..Self::new(origin_year, principal, repayment_years)
        }
    }

    pub fn is_active(&self) -> bool {
        self.years_left > 0.0
    }

    /// Charge this year's installment and advance the schedule by one year
    pub fn collect_installment(&mut self) -> f64 {
        if !self.is_active() {
            return 0.0;
        }
        self.years_left -= 1.0;
        self.yearly_payment
    }
}

/// Collect one installment from every active obligation and drop finished ones
pub fn collect_installments(obligations: &mut Vec<LoanObligation>) -> f64 {
    let total: f64 = obligations.iter_mut().map(LoanObligation::collect_installment).sum();
    obligations.retain(LoanObligation::is_active);
    total
}

/// Fee-paying window of a population, inclusive on both ends
#[derive(Debug, Clone, PartialEq)]
pub struct FeeObligation {
    pub start_year: i32,
    pub end_year: i32,

    /// Amount paid per year by the whole population
    pub yearly_amount: f64,

    /// Population paying (fractional)
    pub payers: f64,
}

impl FeeObligation {
    pub fn is_due(&self, year: i32) -> bool {
        year >= self.start_year && year <= self.end_year
    }

    /// Years still to pay from `year` onward, inclusive
    pub fn remaining_years(&self, year: i32) -> i32 {
        (self.end_year - year.max(self.start_year) + 1).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_whole_term_repays_principal() {
        let mut loan = LoanObligation::new(2026, 120_000.0, 10.0);
        let mut total = 0.0;
        let mut installments = 0;
        while loan.is_active() {
            let paid = loan.collect_installment();
            assert_relative_eq!(paid, 12_000.0);
            total += paid;
            installments += 1;
        }
        assert_eq!(installments, 10);
        assert_relative_eq!(total, 120_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_fractional_term_overshoots_principal() {
        // 100 months = 8.333 years -> 9 installments of A / 8.333
        let years: f64 = 100.0 / 12.0;
        let mut loan = LoanObligation::new(2026, 100_000.0, years);
        let mut total = 0.0;
        let mut installments = 0;
        while loan.is_active() {
            total += loan.collect_installment();
            installments += 1;
        }
        assert_eq!(installments, 9);
        assert_relative_eq!(total, (100_000.0 / years) * years.ceil(), max_relative = 1e-12);
        assert!(total > 100_000.0);
        assert!(loan.years_left < 0.0);
    }

    #[test]
    fn test_collect_installments_drops_finished() {
        let mut obligations = vec![
            LoanObligation::new(2026, 1_000.0, 1.0),
            LoanObligation::new(2026, 2_000.0, 2.0),
        ];
        assert_relative_eq!(collect_installments(&mut obligations), 2_000.0);
        assert_eq!(obligations.len(), 1);
        assert_relative_eq!(collect_installments(&mut obligations), 1_000.0);
        assert!(obligations.is_empty());
        assert_eq!(collect_installments(&mut obligations), 0.0);
    }

    #[test]
    fn test_in_progress_keeps_installment_size() {
        let loan = LoanObligation::in_progress(2020, 100_000.0, 10.0, 4.0);
        assert_relative_eq!(loan.yearly_payment, 10_000.0);
        assert_eq!(loan.years_left, 4.0);
    }

    #[test]
    fn test_fee_window_inclusive() {
        let fee = FeeObligation {
            start_year: 2026,
            end_year: 2034,
            yearly_amount: 600.0,
            payers: 1.0,
        };
        assert!(fee.is_due(2026));
        assert!(fee.is_due(2034));
        assert!(!fee.is_due(2035));
        assert_eq!(fee.remaining_years(2020), 9);
        assert_eq!(fee.remaining_years(2034), 1);
        assert_eq!(fee.remaining_years(2040), 0);
    }
}

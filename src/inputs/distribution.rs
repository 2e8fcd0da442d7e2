//! Marriage-age distribution used to split cohorts into sub-cohorts

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Share of a cohort marrying `deviation_years` away from the base wedding age
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub deviation_years: i32,

    /// Percentage of the cohort, 0-100
    pub percentage: f64,
}

impl DistributionEntry {
    pub fn new(deviation_years: i32, percentage: f64) -> Self {
        Self { deviation_years, percentage }
    }
}

/// Ordered table of distribution entries.
///
/// Percentages should sum to at most 100; the remainder never marries and never
/// borrows. Projections do not check this, see [`MarriageAgeDistribution::validate`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarriageAgeDistribution {
    entries: Vec<DistributionEntry>,
}

impl MarriageAgeDistribution {
    pub fn new(entries: Vec<DistributionEntry>) -> Self {
        Self { entries }
    }

    /// Everyone marries exactly at the base age
    pub fn single_age() -> Self {
        Self::new(vec![DistributionEntry::new(0, 100.0)])
    }

    /// Standard bell spread over ten years around the base age, 5% never marry
    pub fn standard_bell() -> Self {
        let percentages = [3.0, 8.0, 20.0, 20.0, 15.0, 12.0, 8.0, 5.0, 3.0, 1.0, 0.0];
        let entries = (-2..=8)
            .zip(percentages)
            .map(|(deviation, pct)| DistributionEntry::new(deviation, pct))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[DistributionEntry] {
        &self.entries
    }

    /// `(deviation, fraction)` pairs with fraction = percentage / 100
    pub fn buckets(&self) -> Vec<(i32, f64)> {
        self.entries
            .iter()
            .map(|e| (e.deviation_years, e.percentage / 100.0))
            .collect()
    }

    /// Buckets for an optional distribution; absent means a single bucket at deviation 0
    pub fn resolve(distribution: Option<&MarriageAgeDistribution>) -> Vec<(i32, f64)> {
        match distribution {
            Some(d) => d.buckets(),
            None => vec![(0, 1.0)],
        }
    }

    pub fn total_percentage(&self) -> f64 {
        self.entries.iter().map(|e| e.percentage).sum()
    }

    /// Percentage that never marries (reporting only, may be negative for bad tables)
    pub fn unmarried_percentage(&self) -> f64 {
        100.0 - self.total_percentage()
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if let Some(e) = self.entries.iter().find(|e| e.percentage < 0.0) {
            return Err(InputError::NegativePercentage {
                deviation: e.deviation_years,
                percentage: e.percentage,
            });
        }
        let total = self.total_percentage();
        if total > 100.0 + 1e-9 {
            return Err(InputError::DistributionOverflow { total });
        }
        Ok(())
    }
}

//! Year-range filtering on the registration date.

use crate::normalize::registration_year;
use crate::types::{FundRecord, YearRange};

impl YearRange {
    /// Whether `year` lies in the closed interval.
    pub fn contains(&self, year: i32) -> bool {
        self.from <= year && year <= self.to
    }

    /// Whether the record's registration year lies in the range.
    ///
    /// Records with an empty or unparseable `reg_dd` are excluded.
    pub fn keep(&self, record: &FundRecord) -> bool {
        registration_year(&record.reg_dd).is_some_and(|year| self.contains(year))
    }
}

/// Drop records outside `range`, preserving order.
pub fn retain_in_range(records: Vec<FundRecord>, range: &YearRange) -> Vec<FundRecord> {
    records.into_iter().filter(|r| range.keep(r)).collect()
}

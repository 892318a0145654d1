// src/summarise/trend.rs
use serde::Serialize;
use std::collections::BTreeMap;

use crate::clean::FilteredRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyTotal {
    pub year: u16,
    pub students: u64,
}

/// Total students per year, ordered by year.
pub fn yearly_totals(records: &[FilteredRecord]) -> Vec<YearlyTotal> {
    let mut by_year: BTreeMap<u16, u64> = BTreeMap::new();
    for record in records {
        *by_year.entry(record.year).or_default() += record.student_count;
    }
    by_year
        .into_iter()
        .map(|(year, students)| YearlyTotal { year, students })
        .collect()
}

// src/summarise/proportion.rs
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::clean::FilteredRecord;
use crate::config::FilterRules;

/// Three mutually exclusive percentage bands for one year. The bands are
/// computed from independent per-year sums, not serial subtraction, so they
/// sum to 100 whenever the denominator is non-zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearBands {
    pub year: u16,
    pub humanities_pct: f64,
    pub other_society_culture_pct: f64,
    pub everyone_else_pct: f64,
}

#[derive(Default)]
struct YearSums {
    humanities: u64,
    broad_field: u64,
    all: u64,
}

/// Shares of all students per year: the humanities whitelist, the rest of the
/// configured broad field, and everyone else. Takes the full cleaned table —
/// the denominator is every degree-level student. A year with no students at
/// all yields NaN bands, which propagate into the chart uncaught.
pub fn proportion_bands(records: &[FilteredRecord], rules: &FilterRules) -> Vec<YearBands> {
    let subjects: HashSet<&str> = rules.humanities_subjects.iter().map(String::as_str).collect();

    let mut by_year: BTreeMap<u16, YearSums> = BTreeMap::new();
    for record in records {
        let sums = by_year.entry(record.year).or_default();
        sums.all += record.student_count;
        if record.field_broad == rules.broad_field {
            sums.broad_field += record.student_count;
            if subjects.contains(record.field_detailed.as_str()) {
                sums.humanities += record.student_count;
            }
        }
    }

    by_year
        .into_iter()
        .map(|(year, sums)| {
            let all = sums.all as f64;
            YearBands {
                year,
                humanities_pct: sums.humanities as f64 / all * 100.0,
                other_society_culture_pct: (sums.broad_field - sums.humanities) as f64 / all * 100.0,
                everyone_else_pct: (sums.all - sums.broad_field) as f64 / all * 100.0,
            }
        })
        .collect()
}

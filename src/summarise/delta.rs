// src/summarise/delta.rs
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::clean::FilteredRecord;
use crate::config::ViewRules;

/// Per-subject movement between the two compare years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectDelta {
    pub subject: String,
    pub base: u64,
    pub last: u64,
    pub gap: i64,
    /// gap / base × 100. A zero base year gives a non-finite value, which is
    /// left to propagate rather than being caught.
    pub percent_change: f64,
}

/// Sums each subject over the base and compare years, computes the gap and
/// percentage change, drops the configured pseudo-subjects, and sorts
/// ascending by gap (biggest loss first).
///
/// A subject with no rows in a year sums to zero there: missing the base
/// year divides by zero and the non-finite change propagates, while missing
/// the compare year reads as a finite −100% collapse to nothing.
pub fn subject_deltas(records: &[FilteredRecord], rules: &ViewRules) -> Vec<SubjectDelta> {
    let excluded: HashSet<&str> = rules
        .excluded_pseudo_subjects
        .iter()
        .map(String::as_str)
        .collect();

    let mut by_subject: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for record in records {
        let entry = by_subject.entry(record.field_detailed.clone()).or_default();
        if record.year == rules.base_year {
            entry.0 += record.student_count;
        } else if record.year == rules.compare_year {
            entry.1 += record.student_count;
        }
    }

    let mut deltas: Vec<SubjectDelta> = by_subject
        .into_iter()
        .filter(|(subject, _)| !excluded.contains(subject.as_str()))
        .map(|(subject, (base, last))| {
            let gap = last as i64 - base as i64;
            let percent_change = gap as f64 / base as f64 * 100.0;
            SubjectDelta { subject, base, last, gap, percent_change }
        })
        .collect();
    deltas.sort_by_key(|d| d.gap);
    deltas
}

/// The hand-picked subjects shown on the bar chart, in the sorted order
/// `subject_deltas` produced. An empty curated list keeps everything.
pub fn curated_subset(deltas: &[SubjectDelta], rules: &ViewRules) -> Vec<SubjectDelta> {
    if rules.bar_chart_subjects.is_empty() {
        return deltas.to_vec();
    }
    let wanted: HashSet<&str> = rules.bar_chart_subjects.iter().map(String::as_str).collect();
    deltas
        .iter()
        .filter(|d| wanted.contains(d.subject.as_str()))
        .cloned()
        .collect()
}

// src/clean/mod.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, instrument};

use crate::config::FilterRules;
use crate::shape::TallRecord;

/// Trailing footnote markers like "(a)" or "(e)" on hierarchy labels.
static ANNOTATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\([a-z]\)$").unwrap());

/// A cleaned, degree-level observation. The qualification_type field is gone:
/// only the configured "Total" rows survive the filter, so carrying the tag
/// would say nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredRecord {
    pub field_broad: String,
    pub field_narrow: String,
    pub field_detailed: String,
    pub qualification_level: String,
    pub year: u16,
    pub student_count: u64,
}

/// Carries the last non-blank broad/narrow label into subsequent blank rows,
/// mirroring the sheet's merged-row layout. Each column fills independently,
/// in record order.
pub fn forward_fill_hierarchy(records: &[TallRecord]) -> Vec<TallRecord> {
    let mut broad = String::new();
    let mut narrow = String::new();
    records
        .iter()
        .map(|record| {
            let mut filled = record.clone();
            if filled.field_broad.trim().is_empty() {
                filled.field_broad = broad.clone();
            } else {
                broad = filled.field_broad.clone();
            }
            if filled.field_narrow.trim().is_empty() {
                filled.field_narrow = narrow.clone();
            } else {
                narrow = filled.field_narrow.clone();
            }
            filled
        })
        .collect()
}

/// Strips footnote annotations and the subtotal suffix from one label.
pub fn clean_label(raw: &str, subtotal_suffix: &str) -> String {
    let trimmed = raw.trim();
    let without_annotation = ANNOTATION.replace(trimmed, "");
    without_annotation
        .strip_suffix(subtotal_suffix)
        .unwrap_or(&without_annotation)
        .trim()
        .to_string()
}

/// The whole clean stage: hierarchy fill, label cleanup, subtotal drop, the
/// qualification filters, and removal of unknown counts.
#[instrument(level = "debug", skip_all)]
pub fn filter_records(records: &[TallRecord], rules: &FilterRules) -> Vec<FilteredRecord> {
    let levels: HashSet<&str> = rules.qualification_levels.iter().map(String::as_str).collect();

    let filtered: Vec<FilteredRecord> = forward_fill_hierarchy(records)
        .into_iter()
        .filter_map(|record| {
            let field_detailed = clean_label(&record.field_detailed, &rules.subtotal_suffix);
            // rows without a detailed subject are subtotals of the level above
            if field_detailed.is_empty() {
                return None;
            }
            if !levels.contains(record.qualification_level.as_str()) {
                return None;
            }
            if record.qualification_type != rules.total_tag {
                return None;
            }
            let student_count = record.student_count?;
            Some(FilteredRecord {
                field_broad: clean_label(&record.field_broad, &rules.subtotal_suffix),
                field_narrow: clean_label(&record.field_narrow, &rules.subtotal_suffix),
                field_detailed,
                qualification_level: record.qualification_level,
                year: record.year,
                student_count,
            })
        })
        .collect();

    debug!(kept = filtered.len(), dropped = records.len() - filtered.len(), "cleaned records");
    filtered
}

/// Restricts cleaned records to the configured broad field and the curated
/// subject whitelist.
pub fn humanities_subset(records: &[FilteredRecord], rules: &FilterRules) -> Vec<FilteredRecord> {
    let subjects: HashSet<&str> = rules.humanities_subjects.iter().map(String::as_str).collect();
    records
        .iter()
        .filter(|r| r.field_broad == rules.broad_field && subjects.contains(r.field_detailed.as_str()))
        .cloned()
        .collect()
}

// src/shape/unpivot.rs
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::config::SheetLayout;
use crate::load::RawSheet;

/// One observation from the unpivoted sheet: a subject-hierarchy triple, the
/// qualification attributes recovered from the composite column name, and the
/// count for one year. A blank count cell is `None` ("unknown") and is dropped
/// by the clean stage before anything is summed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallRecord {
    pub field_broad: String,
    pub field_narrow: String,
    pub field_detailed: String,
    pub qualification_level: String,
    pub qualification_type: String,
    pub year: u16,
    pub student_count: Option<u64>,
}

/// A wide table rebuilt from tall records; only exists to check that the
/// unpivot lost nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    pub names: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Unpivots the data grid: the leading `subject_columns` cells of each row
/// fill the hierarchy triple in order (broad, narrow, detailed; absent levels
/// stay blank), and every remaining cell becomes one `TallRecord` keyed by
/// its composite column name split back into (level, type, year). Emits
/// exactly rows × names.len() records.
pub fn unpivot(data: &RawSheet, names: &[String], layout: &SheetLayout) -> Result<Vec<TallRecord>> {
    if layout.subject_columns > 3 {
        bail!(
            "subject_columns is {}, but the field-of-education hierarchy has only three levels",
            layout.subject_columns
        );
    }
    let width = layout.subject_columns + names.len();
    let keys: Vec<(String, String, u16)> = names
        .iter()
        .map(|name| split_composite(name, &layout.separator))
        .collect::<Result<_>>()?;

    let mut records = Vec::with_capacity(data.rows.len() * names.len());
    for (row_idx, row) in data.rows.iter().enumerate() {
        if row.len() > width {
            bail!(
                "data row {} has {} cells but headers describe only {} columns",
                row_idx,
                row.len(),
                width
            );
        }
        let mut padded = row.clone();
        padded.resize(width, String::new());

        let subject = |idx: usize| -> String {
            if idx < layout.subject_columns {
                padded[idx].clone()
            } else {
                String::new()
            }
        };

        for (col, (level, qual_type, year)) in keys.iter().enumerate() {
            records.push(TallRecord {
                field_broad: subject(0),
                field_narrow: subject(1),
                field_detailed: subject(2),
                qualification_level: level.clone(),
                qualification_type: qual_type.clone(),
                year: *year,
                student_count: parse_count(&padded[layout.subject_columns + col]),
            });
        }
    }
    debug!(records = records.len(), "unpivoted wide table");
    Ok(records)
}

/// Inverse of [`unpivot`]: regroups tall records into a wide table, columns
/// and rows in first-seen order.
pub fn pivot(records: &[TallRecord], layout: &SheetLayout) -> WideTable {
    let mut names: Vec<String> = Vec::new();
    let mut name_index: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row_index: HashMap<(String, String, String), usize> = HashMap::new();

    for record in records {
        let name = format!(
            "{}{sep}{}{sep}{}",
            record.qualification_level,
            record.qualification_type,
            record.year,
            sep = &layout.separator
        );
        let col = *name_index.entry(name.clone()).or_insert_with(|| {
            names.push(name.clone());
            names.len() - 1
        });

        let key = (
            record.field_broad.clone(),
            record.field_narrow.clone(),
            record.field_detailed.clone(),
        );
        let row = *row_index.entry(key.clone()).or_insert_with(|| {
            let labels = [key.0.clone(), key.1.clone(), key.2.clone()];
            rows.push(labels[..layout.subject_columns.min(3)].to_vec());
            rows.len() - 1
        });

        let cell = layout.subject_columns + col;
        if rows[row].len() <= cell {
            rows[row].resize(cell + 1, String::new());
        }
        rows[row][cell] = match record.student_count {
            Some(count) => count.to_string(),
            None => String::new(),
        };
    }

    WideTable { names, rows }
}

fn split_composite(name: &str, separator: &str) -> Result<(String, String, u16)> {
    let parts: Vec<&str> = name.split(separator).collect();
    if parts.len() != 3 {
        bail!(
            "composite header `{}` has {} parts, expected level{sep}type{sep}year",
            name,
            parts.len(),
            sep = separator
        );
    }
    let year: u16 = parts[2]
        .trim()
        .parse()
        .with_context(|| format!("composite header `{}` has a non-numeric year", name))?;
    Ok((parts[0].trim().to_string(), parts[1].trim().to_string(), year))
}

/// Blank cells are unknown; so are suppression markers like "np". Thousands
/// separators appear in some published sheets and are ignored.
fn parse_count(cell: &str) -> Option<u64> {
    let cleaned = cell.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SheetLayout {
        SheetLayout {
            subject_columns: 3,
            separator: "|".to_string(),
            ..SheetLayout::default()
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn sample() -> (RawSheet, Vec<String>) {
        let data = RawSheet {
            rows: vec![
                strings(&["Society and Culture", "Human Society", "History", "100", "80"]),
                strings(&["", "", "Philosophy", "50", ""]),
            ],
        };
        let names = strings(&["Bachelors|Total|2008", "Bachelors|Total|2017"]);
        (data, names)
    }

    #[test]
    fn emits_rows_times_data_columns() {
        let (data, names) = sample();
        let records = unpivot(&data, &names, &layout()).unwrap();
        assert_eq!(records.len(), 2 * 2);

        let first = &records[0];
        assert_eq!(first.field_detailed, "History");
        assert_eq!(first.qualification_level, "Bachelors");
        assert_eq!(first.qualification_type, "Total");
        assert_eq!(first.year, 2008);
        assert_eq!(first.student_count, Some(100));
    }

    #[test]
    fn blank_and_unparsable_counts_become_unknown() {
        let (data, names) = sample();
        let records = unpivot(&data, &names, &layout()).unwrap();
        assert_eq!(records[3].field_detailed, "Philosophy");
        assert_eq!(records[3].student_count, None);
        assert_eq!(parse_count("np"), None);
        assert_eq!(parse_count("1,234"), Some(1234));
    }

    #[test]
    fn pivot_reverses_unpivot() {
        let (data, names) = sample();
        let records = unpivot(&data, &names, &layout()).unwrap();
        let wide = pivot(&records, &layout());
        assert_eq!(wide.names, names);

        // every row padded to full width, as unpivot saw it
        let expected: Vec<Vec<String>> = data
            .rows
            .iter()
            .map(|r| {
                let mut row = r.clone();
                row.resize(5, String::new());
                row
            })
            .collect();
        assert_eq!(wide.rows, expected);
    }

    #[test]
    fn narrower_subject_hierarchy_leaves_absent_levels_blank() {
        let layout = SheetLayout {
            subject_columns: 1,
            ..layout()
        };
        let data = RawSheet {
            rows: vec![strings(&["History", "100"])],
        };
        let names = strings(&["Bachelors|Total|2008"]);

        let records = unpivot(&data, &names, &layout).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field_broad, "History");
        assert_eq!(records[0].field_narrow, "");
        assert_eq!(records[0].field_detailed, "");
        assert_eq!(records[0].student_count, Some(100));

        // the roundtrip holds for the narrower layout too
        let wide = pivot(&records, &layout);
        assert_eq!(wide.rows, vec![strings(&["History", "100"])]);
    }

    #[test]
    fn more_than_three_subject_columns_is_fatal() {
        let bad = SheetLayout {
            subject_columns: 4,
            ..layout()
        };
        let data = RawSheet {
            rows: vec![strings(&["a", "b", "c", "d", "100"])],
        };
        let names = strings(&["Bachelors|Total|2008"]);
        let err = unpivot(&data, &names, &bad).unwrap_err();
        assert!(err.to_string().contains("three levels"));
    }

    #[test]
    fn overwide_row_is_fatal() {
        let (mut data, names) = sample();
        data.rows[0].push("999".to_string());
        assert!(unpivot(&data, &names, &layout()).is_err());
    }

    #[test]
    fn malformed_composite_is_fatal() {
        let (data, _) = sample();
        let names = strings(&["Bachelors|2008"]);
        assert!(unpivot(&data, &names, &layout()).is_err());
        let names = strings(&["Bachelors|Total|not-a-year"]);
        assert!(unpivot(&data, &names, &layout()).is_err());
    }
}

// src/shape/headers.rs
use anyhow::{bail, Result};

use crate::config::SheetLayout;
use crate::load::RawSheet;

/// Scan-and-carry fill over an ordered sequence: every blank takes the last
/// non-blank value seen. This is the merged-cell simulation — a merged label
/// visually spans several cells but the file records it only in the first.
pub fn forward_fill(values: &[String]) -> Vec<String> {
    let mut carried = String::new();
    values
        .iter()
        .map(|v| {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                carried = trimmed.to_string();
            }
            carried.clone()
        })
        .collect()
}

/// Builds one composite name per data column by forward-filling each header
/// row and joining the stacked labels on `layout.separator`.
///
/// Two shapes are fatal here rather than downstream: a blank leading label on
/// any header row (the carry has nothing to start from, so every name on that
/// row would be malformed) and a label containing the separator (the split in
/// the reshaper would be ambiguous).
pub fn composite_names(
    headers: &RawSheet,
    layout: &SheetLayout,
    total_columns: usize,
) -> Result<Vec<String>> {
    if headers.rows.len() != layout.header_rows {
        bail!(
            "expected {} header rows, found {}",
            layout.header_rows,
            headers.rows.len()
        );
    }
    if total_columns <= layout.subject_columns {
        bail!(
            "sheet has {} columns, nothing beyond the {} subject columns",
            total_columns,
            layout.subject_columns
        );
    }

    let mut filled_rows = Vec::with_capacity(headers.rows.len());
    for (row_idx, row) in headers.rows.iter().enumerate() {
        let mut padded = row.clone();
        padded.resize(total_columns, String::new());
        let data_cells = &padded[layout.subject_columns..];

        match data_cells.first() {
            Some(first) if !first.trim().is_empty() => {}
            _ => bail!(
                "header row {} is blank at the first data column; \
                 forward-fill cannot recover its labels",
                row_idx
            ),
        }
        for cell in data_cells {
            if cell.contains(&layout.separator) {
                bail!(
                    "header label `{}` contains the separator `{}`",
                    cell,
                    layout.separator
                );
            }
        }

        filled_rows.push(forward_fill(data_cells));
    }

    let width = total_columns - layout.subject_columns;
    let names = (0..width)
        .map(|col| {
            filled_rows
                .iter()
                .map(|row| row[col].as_str())
                .collect::<Vec<_>>()
                .join(&layout.separator)
        })
        .collect();
    Ok(names)
}
